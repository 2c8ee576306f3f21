use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{DocumentStore, StoreResult};
use crate::models::{NewDocument, WorkshopDocument};
use crate::utils::errors::StorageError;

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    name: String,
    doc_type: String,
    size: i64,
    url: String,
    category: String,
    upload_date: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for WorkshopDocument {
    type Error = StorageError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(WorkshopDocument {
            id: row.id,
            name: row.name,
            doc_type: row.doc_type,
            size: row.size,
            url: row.url,
            category: row.category.parse().map_err(StorageError::Corrupt)?,
            upload_date: row.upload_date,
        })
    }
}

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentRepository {
    async fn insert(&self, document: NewDocument) -> StoreResult<WorkshopDocument> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, name, doc_type, size, url, category, upload_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(document.name)
        .bind(document.doc_type)
        .bind(document.size)
        .bind(document.url)
        .bind(document.category.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list(&self) -> StoreResult<Vec<WorkshopDocument>> {
        sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents ORDER BY upload_date DESC")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(WorkshopDocument::try_from)
            .collect()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
