// src/store/postgres.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    store::{Document, DocumentStore},
};

/// Document store over a single Postgres `documents` table (JSONB payloads).
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

/// Helper struct for reading `(id, data)` rows.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        let data = match row.data.0 {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Document { id: row.id, data }
    }
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT collection FROM documents ORDER BY collection")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list collections: {:?}", e);
                    AppError::from(e)
                })?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND data -> $2 = $3
            ORDER BY id
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to query {} by {}: {:?}", collection, field, e);
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(collection)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), AppError> {
        // `||` on JSONB objects is a shallow merge, right side wins.
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET
                data = documents.data || EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to merge {}/{}: {:?}", collection, id, e);
            AppError::from(e)
        })?;

        Ok(())
    }
}
