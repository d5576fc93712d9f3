// src/store/mod.rs

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Collection holding one response document per (student, quiz).
pub const RESPONSES: &str = "responses";
/// Collection holding roster entries keyed by lower-cased email.
pub const ROSTER: &str = "roster";

/// A stored document: its key within the collection and its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

/// Key-value document database.
///
/// `get` returns `None` for a missing document, which is distinct from a
/// document with no fields.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<String>, AppError>;

    /// All documents of a collection, ordered by id.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError>;

    /// Documents whose top-level `field` equals `value`, ordered by id.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError>;

    /// Batched lookup; missing ids are simply absent from the result.
    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>, AppError>;

    /// Upsert with shallow merge: top-level keys in `fields` overwrite,
    /// all other stored keys are kept. Dotted keys are literal field names.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), AppError>;
}
