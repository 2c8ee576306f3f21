//! Record Store en memoria
//!
//! Se usa cuando no hay `DATABASE_URL` y en los tests. Un único `RwLock`
//! serializa las escrituras; last-write-wins igual que en PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    DocumentStore, OrderSummary, PartStore, ServiceOrderStore, StoreResult, VehicleStore,
};
use crate::models::{
    NewDocument, NewPart, NewServiceOrder, NewVehicle, Part, PartChanges, ServiceOrder,
    ServiceStatus, Vehicle, VehicleChanges, WorkshopDocument,
};
use crate::utils::errors::StorageError;

#[derive(Default)]
struct Tables {
    orders: HashMap<Uuid, ServiceOrder>,
    vehicles: HashMap<Uuid, Vehicle>,
    parts: HashMap<Uuid, Part>,
    documents: HashMap<Uuid, WorkshopDocument>,
}

impl Tables {
    /// Las órdenes se guardan sin vehículo; se embebe al leer
    fn resolve(&self, order: &ServiceOrder) -> ServiceOrder {
        let mut resolved = order.clone();
        resolved.vehicle = order
            .vehicle_id
            .and_then(|vehicle_id| self.vehicles.get(&vehicle_id).cloned());
        resolved
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl ServiceOrderStore for MemoryStore {
    async fn insert(&self, order: NewServiceOrder) -> StoreResult<ServiceOrder> {
        let mut tables = self.tables.write().await;

        if let Some(vehicle_id) = order.vehicle_id {
            if !tables.vehicles.contains_key(&vehicle_id) {
                return Err(StorageError::Conflict(format!(
                    "vehicle '{}' does not exist",
                    vehicle_id
                )));
            }
        }

        let now = Utc::now();
        let stored = ServiceOrder {
            id: Uuid::new_v4(),
            description: order.description,
            vehicle_id: order.vehicle_id,
            temp_plate: order.temp_plate,
            mechanic_id: order.mechanic_id,
            total_cost: order.total_cost,
            notes: order.notes,
            start_date: now,
            end_date: (order.status == ServiceStatus::Completed).then_some(now),
            status: order.status,
            vehicle: None,
        };
        tables.orders.insert(stored.id, stored.clone());
        Ok(tables.resolve(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ServiceOrder>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).map(|order| tables.resolve(order)))
    }

    async fn list(&self) -> StoreResult<Vec<ServiceOrder>> {
        let tables = self.tables.read().await;
        let orders = tables.orders.values().map(|order| tables.resolve(order)).collect();
        Ok(newest_first(orders, |order: &ServiceOrder| order.start_date))
    }

    async fn complete(
        &self,
        id: Uuid,
        total_cost: Decimal,
        end_date: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceOrder>> {
        let mut tables = self.tables.write().await;
        let completed = match tables.orders.get_mut(&id) {
            Some(order) if !order.status.is_terminal() => {
                order.total_cost = total_cost;
                order.status = ServiceStatus::Completed;
                order.end_date = Some(end_date);
                order.clone()
            }
            _ => return Ok(None),
        };
        Ok(Some(tables.resolve(&completed)))
    }

    async fn replace(
        &self,
        expected: ServiceStatus,
        order: &ServiceOrder,
    ) -> StoreResult<Option<ServiceOrder>> {
        let mut tables = self.tables.write().await;

        if let Some(vehicle_id) = order.vehicle_id {
            if !tables.vehicles.contains_key(&vehicle_id) {
                return Err(StorageError::Conflict(format!(
                    "vehicle '{}' does not exist",
                    vehicle_id
                )));
            }
        }

        let replaced = match tables.orders.get_mut(&order.id) {
            Some(current) if current.status == expected => {
                current.description = order.description.clone();
                current.vehicle_id = order.vehicle_id;
                current.temp_plate = order.temp_plate.clone();
                current.notes = order.notes.clone();
                current.status = order.status;
                current.total_cost = order.total_cost;
                current.end_date = order.end_date;
                current.clone()
            }
            _ => return Ok(None),
        };
        Ok(Some(tables.resolve(&replaced)))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }

    async fn summary(&self) -> StoreResult<OrderSummary> {
        let tables = self.tables.read().await;
        let summary = tables.orders.values().fold(OrderSummary::default(), |mut acc, order| {
            match order.status {
                ServiceStatus::Completed => acc.revenue += order.total_cost,
                ServiceStatus::InProgress => acc.in_progress += 1,
                ServiceStatus::PendingApproval => acc.pending_approval += 1,
                _ => {}
            }
            acc
        });
        Ok(summary)
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn insert(&self, vehicle: NewVehicle) -> StoreResult<Vehicle> {
        let stored = Vehicle {
            id: Uuid::new_v4(),
            plate: vehicle.plate,
            model: vehicle.model,
            brand: vehicle.brand,
            year: vehicle.year,
            color: vehicle.color,
            owner_name: vehicle.owner_name,
            owner_phone: vehicle.owner_phone,
            status: vehicle.status,
            created_at: Utc::now(),
        };
        self.tables.write().await.vehicles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Vehicle>> {
        let vehicles = self.tables.read().await.vehicles.values().cloned().collect();
        Ok(newest_first(vehicles, |vehicle: &Vehicle| vehicle.created_at))
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> StoreResult<Option<Vehicle>> {
        let mut tables = self.tables.write().await;
        Ok(tables.vehicles.get_mut(&id).map(|vehicle| {
            vehicle.apply(changes);
            vehicle.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.orders.values().any(|order| order.vehicle_id == Some(id)) {
            return Err(StorageError::Conflict(format!(
                "vehicle '{}' is referenced by service orders",
                id
            )));
        }
        Ok(tables.vehicles.remove(&id).is_some())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.vehicles.len() as i64)
    }
}

#[async_trait]
impl PartStore for MemoryStore {
    async fn insert(&self, part: NewPart) -> StoreResult<Part> {
        let stored = Part {
            id: Uuid::new_v4(),
            name: part.name,
            code: part.code,
            category: part.category,
            quantity: part.quantity,
            min_quantity: part.min_quantity,
            purchase_price: part.purchase_price,
            markup: part.markup,
            price: part.price,
            supplier: part.supplier,
            location: part.location,
            created_at: Utc::now(),
        };
        self.tables.write().await.parts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Part>> {
        Ok(self.tables.read().await.parts.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Part>> {
        let parts = self.tables.read().await.parts.values().cloned().collect();
        Ok(newest_first(parts, |part: &Part| part.created_at))
    }

    async fn update(&self, id: Uuid, changes: PartChanges) -> StoreResult<Option<Part>> {
        let mut tables = self.tables.write().await;
        Ok(tables.parts.get_mut(&id).map(|part| {
            part.apply(changes);
            part.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.parts.remove(&id).is_some())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: NewDocument) -> StoreResult<WorkshopDocument> {
        let stored = WorkshopDocument {
            id: Uuid::new_v4(),
            name: document.name,
            doc_type: document.doc_type,
            size: document.size,
            url: document.url,
            category: document.category,
            upload_date: Utc::now(),
        };
        self.tables.write().await.documents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> StoreResult<Vec<WorkshopDocument>> {
        let documents = self.tables.read().await.documents.values().cloned().collect();
        Ok(newest_first(documents, |document: &WorkshopDocument| document.upload_date))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.documents.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleStatus;

    fn draft(temp_plate: Option<&str>, vehicle_id: Option<Uuid>) -> NewServiceOrder {
        NewServiceOrder {
            description: "Troca de óleo".to_string(),
            vehicle_id,
            temp_plate: temp_plate.map(str::to_string),
            mechanic_id: "m1".to_string(),
            notes: None,
            status: ServiceStatus::PendingApproval,
            total_cost: Decimal::ZERO,
        }
    }

    async fn vehicle(store: &MemoryStore) -> Vehicle {
        VehicleStore::insert(
            store,
            NewVehicle {
                plate: "QWE4R56".to_string(),
                model: "Onix".to_string(),
                brand: "Chevrolet".to_string(),
                year: Some(2019),
                color: None,
                owner_name: Some("Leôncio".to_string()),
                owner_phone: None,
                status: VehicleStatus::Waiting,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_orders_embed_vehicle_and_sort_newest_first() {
        let store = MemoryStore::new();
        let car = vehicle(&store).await;

        let first = ServiceOrderStore::insert(&store, draft(Some("ABC1D23"), None)).await.unwrap();
        let second = ServiceOrderStore::insert(&store, draft(None, Some(car.id))).await.unwrap();
        assert_eq!(second.vehicle.as_ref().map(|v| v.plate.as_str()), Some("QWE4R56"));

        let listed = ServiceOrderStore::list(&store).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_complete_is_conditional_on_non_terminal_status() {
        let store = MemoryStore::new();
        let order = ServiceOrderStore::insert(&store, draft(Some("ABC1D23"), None)).await.unwrap();

        let done = store
            .complete(order.id, Decimal::new(350, 0), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, ServiceStatus::Completed);

        let again = store.complete(order.id, Decimal::ONE, Utc::now()).await.unwrap();
        assert!(again.is_none());
        assert!(store.complete(Uuid::new_v4(), Decimal::ONE, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_requires_expected_status() {
        let store = MemoryStore::new();
        let mut order = ServiceOrderStore::insert(&store, draft(Some("ABC1D23"), None)).await.unwrap();
        order.notes = Some("cliente aguarda".to_string());

        assert!(store.replace(ServiceStatus::Pending, &order).await.unwrap().is_none());
        let replaced = store
            .replace(ServiceStatus::PendingApproval, &order)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.notes.as_deref(), Some("cliente aguarda"));
    }

    #[tokio::test]
    async fn test_referenced_vehicle_cannot_be_deleted() {
        let store = MemoryStore::new();
        let car = vehicle(&store).await;
        ServiceOrderStore::insert(&store, draft(None, Some(car.id))).await.unwrap();

        let result = VehicleStore::delete(&store, car.id).await;
        assert!(matches!(result, Err(StorageError::Conflict(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_summary() {
        let store = MemoryStore::new();
        let a = ServiceOrderStore::insert(&store, draft(Some("A"), None)).await.unwrap();
        ServiceOrderStore::insert(&store, draft(Some("B"), None)).await.unwrap();
        store.complete(a.id, Decimal::new(12050, 2), Utc::now()).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.revenue, Decimal::new(12050, 2));
        assert_eq!(summary.pending_approval, 1);
        assert_eq!(summary.in_progress, 0);
    }
}
