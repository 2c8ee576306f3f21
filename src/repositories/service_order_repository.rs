use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::vehicle_repository::fetch_vehicles_by_ids;
use super::{OrderSummary, ServiceOrderStore, StoreResult};
use crate::models::{NewServiceOrder, ServiceOrder, ServiceStatus};
use crate::utils::errors::StorageError;

#[derive(Debug, sqlx::FromRow)]
struct ServiceOrderRow {
    id: Uuid,
    description: String,
    vehicle_id: Option<Uuid>,
    temp_plate: Option<String>,
    mechanic_id: String,
    total_cost: Decimal,
    notes: Option<String>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<ServiceOrderRow> for ServiceOrder {
    type Error = StorageError;

    fn try_from(row: ServiceOrderRow) -> Result<Self, Self::Error> {
        Ok(ServiceOrder {
            id: row.id,
            description: row.description,
            vehicle_id: row.vehicle_id,
            temp_plate: row.temp_plate,
            mechanic_id: row.mechanic_id,
            total_cost: row.total_cost,
            notes: row.notes,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse().map_err(StorageError::Corrupt)?,
            vehicle: None,
        })
    }
}

pub struct PgServiceOrderRepository {
    pool: PgPool,
}

impl PgServiceOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convierte filas en órdenes con su vehículo embebido
    async fn resolve(&self, rows: Vec<ServiceOrderRow>) -> StoreResult<Vec<ServiceOrder>> {
        let mut vehicle_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.vehicle_id).collect();
        vehicle_ids.sort();
        vehicle_ids.dedup();
        let vehicles = fetch_vehicles_by_ids(&self.pool, vehicle_ids).await?;

        rows.into_iter()
            .map(|row| {
                let mut order = ServiceOrder::try_from(row)?;
                order.vehicle = order.vehicle_id.and_then(|id| vehicles.get(&id).cloned());
                Ok(order)
            })
            .collect()
    }

    async fn resolve_one(&self, row: Option<ServiceOrderRow>) -> StoreResult<Option<ServiceOrder>> {
        match row {
            Some(row) => Ok(self.resolve(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ServiceOrderStore for PgServiceOrderRepository {
    async fn insert(&self, order: NewServiceOrder) -> StoreResult<ServiceOrder> {
        let now = Utc::now();
        let end_date = (order.status == ServiceStatus::Completed).then_some(now);

        let row = sqlx::query_as::<_, ServiceOrderRow>(
            r#"
            INSERT INTO service_orders
                (id, description, vehicle_id, temp_plate, mechanic_id, total_cost, notes, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(order.description)
        .bind(order.vehicle_id)
        .bind(order.temp_plate)
        .bind(order.mechanic_id)
        .bind(order.total_cost)
        .bind(order.notes)
        .bind(now)
        .bind(end_date)
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.resolve_one(Some(row))
            .await?
            .ok_or_else(|| StorageError::Corrupt("inserted service order vanished".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ServiceOrder>> {
        let row = sqlx::query_as::<_, ServiceOrderRow>("SELECT * FROM service_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        self.resolve_one(row).await
    }

    async fn list(&self) -> StoreResult<Vec<ServiceOrder>> {
        let rows = sqlx::query_as::<_, ServiceOrderRow>(
            "SELECT * FROM service_orders ORDER BY start_date DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        self.resolve(rows).await
    }

    async fn complete(
        &self,
        id: Uuid,
        total_cost: Decimal,
        end_date: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceOrder>> {
        let row = sqlx::query_as::<_, ServiceOrderRow>(
            r#"
            UPDATE service_orders
            SET total_cost = $2, status = 'completed', end_date = $3
            WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
            RETURNING *
            "#
        )
        .bind(id)
        .bind(total_cost)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?;

        self.resolve_one(row).await
    }

    async fn replace(
        &self,
        expected: ServiceStatus,
        order: &ServiceOrder,
    ) -> StoreResult<Option<ServiceOrder>> {
        let row = sqlx::query_as::<_, ServiceOrderRow>(
            r#"
            UPDATE service_orders
            SET description = $3, vehicle_id = $4, temp_plate = $5, notes = $6,
                status = $7, total_cost = $8, end_date = $9
            WHERE id = $1 AND status = $2
            RETURNING *
            "#
        )
        .bind(order.id)
        .bind(expected.as_str())
        .bind(&order.description)
        .bind(order.vehicle_id)
        .bind(&order.temp_plate)
        .bind(&order.notes)
        .bind(order.status.as_str())
        .bind(order.total_cost)
        .bind(order.end_date)
        .fetch_optional(&self.pool)
        .await?;

        self.resolve_one(row).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM service_orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn summary(&self) -> StoreResult<OrderSummary> {
        let (revenue, in_progress, pending_approval): (Decimal, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_cost) FILTER (WHERE status = 'completed'), 0),
                COUNT(*) FILTER (WHERE status = 'in-progress'),
                COUNT(*) FILTER (WHERE status = 'pending_approval')
            FROM service_orders
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderSummary {
            revenue,
            in_progress,
            pending_approval,
        })
    }
}
