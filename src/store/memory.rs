// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    store::{Document, DocumentStore},
};

type Collection = BTreeMap<String, Map<String, Value>>;

/// In-process document store for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_document((id, data): (&String, &Map<String, Value>)) -> Document {
    Document {
        id: id.clone(),
        data: data.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.iter().map(to_document).collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get_key_value(id))
            .map(to_document))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .filter(|(_, data)| data.get(field) == Some(value))
                    .map(to_document)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        let Some(c) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut docs: Vec<Document> = ids
            .iter()
            .filter_map(|id| c.get_key_value(id.as_str()))
            .map(to_document)
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        docs.dedup_by(|a, b| a.id == b.id);
        Ok(docs)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        doc.extend(fields);
        Ok(())
    }
}
