use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{StoreResult, VehicleStore};
use crate::models::{NewVehicle, Vehicle, VehicleChanges};
use crate::utils::errors::StorageError;

// Fila tal como está en la tabla vehicles
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VehicleRow {
    pub id: Uuid,
    pub plate: String,
    pub model: String,
    pub brand: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StorageError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Vehicle {
            id: row.id,
            plate: row.plate,
            model: row.model,
            brand: row.brand,
            year: row.year,
            color: row.color,
            owner_name: row.owner_name,
            owner_phone: row.owner_phone,
            status: row.status.parse().map_err(StorageError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

/// Carga en una sola consulta los vehículos que embeben las órdenes
pub(crate) async fn fetch_vehicles_by_ids(
    pool: &PgPool,
    ids: Vec<Uuid>,
) -> StoreResult<HashMap<Uuid, Vehicle>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| Vehicle::try_from(row).map(|vehicle| (vehicle.id, vehicle)))
        .collect()
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleRepository {
    async fn insert(&self, vehicle: NewVehicle) -> StoreResult<Vehicle> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (id, plate, model, brand, year, color, owner_name, owner_phone, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.plate)
        .bind(vehicle.model)
        .bind(vehicle.brand)
        .bind(vehicle.year)
        .bind(vehicle.color)
        .bind(vehicle.owner_name)
        .bind(vehicle.owner_phone)
        .bind(vehicle.status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Vehicle>> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> StoreResult<Option<Vehicle>> {
        let mut tx = self.pool.begin().await?;

        // Bloquear la fila para que el merge de campos no pise otra escritura
        let current = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        let mut vehicle = Vehicle::try_from(current)?;
        vehicle.apply(changes);

        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE vehicles
            SET plate = $2, model = $3, brand = $4, year = $5, color = $6,
                owner_name = $7, owner_phone = $8, status = $9
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(vehicle.plate)
        .bind(vehicle.model)
        .bind(vehicle.brand)
        .bind(vehicle.year)
        .bind(vehicle.color)
        .bind(vehicle.owner_name)
        .bind(vehicle.owner_phone)
        .bind(vehicle.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into().map(Some)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return StorageError::Conflict(format!(
                            "vehicle '{}' is referenced by service orders",
                            id
                        ));
                    }
                }
                StorageError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
