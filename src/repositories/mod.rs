//! Record Store
//!
//! Interfaces de persistencia por tipo de entidad. Cada escritura devuelve el
//! registro completo persistido (id y marcas de tiempo generados aquí).
//! Hay una implementación PostgreSQL sobre `sqlx` y un store en memoria.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    NewDocument, NewPart, NewServiceOrder, NewVehicle, Part, PartChanges, ServiceOrder,
    ServiceStatus, Vehicle, VehicleChanges, WorkshopDocument,
};
use crate::utils::errors::StorageError;

pub mod document_repository;
pub mod memory;
pub mod part_repository;
pub mod service_order_repository;
pub mod vehicle_repository;

pub use document_repository::PgDocumentRepository;
pub use memory::MemoryStore;
pub use part_repository::PgPartRepository;
pub use service_order_repository::PgServiceOrderRepository;
pub use vehicle_repository::PgVehicleRepository;

pub type StoreResult<T> = Result<T, StorageError>;

/// Agregados que necesita el panel del administrador
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSummary {
    pub revenue: Decimal,
    pub in_progress: i64,
    pub pending_approval: i64,
}

#[async_trait]
pub trait ServiceOrderStore: Send + Sync {
    async fn insert(&self, order: NewServiceOrder) -> StoreResult<ServiceOrder>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ServiceOrder>>;

    /// Todas las órdenes, más recientes primero (start_date desc)
    async fn list(&self) -> StoreResult<Vec<ServiceOrder>>;

    /// Pasa la orden a `completed` solo si existe y no es terminal.
    /// `None` significa que la condición no se cumplió.
    async fn complete(
        &self,
        id: Uuid,
        total_cost: Decimal,
        end_date: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceOrder>>;

    /// Reemplaza los campos editables si el estado persistido sigue siendo
    /// `expected`. `None` si la orden no existe o cambió entre medio.
    async fn replace(
        &self,
        expected: ServiceStatus,
        order: &ServiceOrder,
    ) -> StoreResult<Option<ServiceOrder>>;

    /// `false` si no existía
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn summary(&self) -> StoreResult<OrderSummary>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn insert(&self, vehicle: NewVehicle) -> StoreResult<Vehicle>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;
    async fn list(&self) -> StoreResult<Vec<Vehicle>>;
    async fn update(&self, id: Uuid, changes: VehicleChanges) -> StoreResult<Option<Vehicle>>;
    /// Falla con `StorageError::Conflict` si alguna orden referencia el vehículo
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    async fn count(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait PartStore: Send + Sync {
    async fn insert(&self, part: NewPart) -> StoreResult<Part>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Part>>;
    async fn list(&self) -> StoreResult<Vec<Part>>;
    async fn update(&self, id: Uuid, changes: PartChanges) -> StoreResult<Option<Part>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, document: NewDocument) -> StoreResult<WorkshopDocument>;
    async fn list(&self) -> StoreResult<Vec<WorkshopDocument>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
