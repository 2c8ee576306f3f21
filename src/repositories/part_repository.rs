use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PartStore, StoreResult};
use crate::models::{NewPart, Part, PartChanges};

#[derive(Debug, sqlx::FromRow)]
struct PartRow {
    id: Uuid,
    name: String,
    code: String,
    category: Option<String>,
    quantity: i32,
    min_quantity: i32,
    purchase_price: Decimal,
    markup: Decimal,
    price: Decimal,
    supplier: Option<String>,
    location: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PartRow> for Part {
    fn from(row: PartRow) -> Self {
        Part {
            id: row.id,
            name: row.name,
            code: row.code,
            category: row.category,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            purchase_price: row.purchase_price,
            markup: row.markup,
            price: row.price,
            supplier: row.supplier,
            location: row.location,
            created_at: row.created_at,
        }
    }
}

pub struct PgPartRepository {
    pool: PgPool,
}

impl PgPartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PartStore for PgPartRepository {
    async fn insert(&self, part: NewPart) -> StoreResult<Part> {
        let row = sqlx::query_as::<_, PartRow>(
            r#"
            INSERT INTO parts
                (id, name, code, category, quantity, min_quantity, purchase_price, markup, price, supplier, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(part.name)
        .bind(part.code)
        .bind(part.category)
        .bind(part.quantity)
        .bind(part.min_quantity)
        .bind(part.purchase_price)
        .bind(part.markup)
        .bind(part.price)
        .bind(part.supplier)
        .bind(part.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Part>> {
        let row = sqlx::query_as::<_, PartRow>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Part::from))
    }

    async fn list(&self) -> StoreResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>("SELECT * FROM parts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Part::from).collect())
    }

    async fn update(&self, id: Uuid, changes: PartChanges) -> StoreResult<Option<Part>> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, PartRow>("SELECT * FROM parts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        let mut part = Part::from(current);
        part.apply(changes);

        let row = sqlx::query_as::<_, PartRow>(
            r#"
            UPDATE parts
            SET name = $2, code = $3, category = $4, quantity = $5, min_quantity = $6,
                purchase_price = $7, markup = $8, price = $9, supplier = $10, location = $11
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(part.name)
        .bind(part.code)
        .bind(part.category)
        .bind(part.quantity)
        .bind(part.min_quantity)
        .bind(part.purchase_price)
        .bind(part.markup)
        .bind(part.price)
        .bind(part.supplier)
        .bind(part.location)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
