//! Gestor del ciclo de vida de las órdenes de servicio
//!
//! Orquestación delgada sobre el Record Store: valida los borradores, aplica
//! la máquina de estados y publica `order-created` / `order-updated` en el
//! hub una vez que la escritura quedó persistida. La publicación es
//! best-effort: nunca revierte ni hace fallar la escritura.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::service_order_dto::{
    ApproveServiceOrderRequest, CreateServiceOrderRequest, DirectServiceOrderRequest,
    UpdateServiceOrderRequest,
};
use crate::models::{DashboardStats, NewServiceOrder, ServiceOrder, ServiceStatus};
use crate::realtime::{BroadcastHub, OrderEvent};
use crate::repositories::{ServiceOrderStore, VehicleStore};
use crate::utils::errors::ServiceOrderError;
use crate::utils::validation::{non_blank, normalize_plate, MAX_AMOUNT};

type LifecycleResult<T> = Result<T, ServiceOrderError>;

/// Interpreta un monto recibido por JSON (número o string numérico).
/// Montos negativos, vacíos, no numéricos o mayores que `MAX_AMOUNT` son
/// `InvalidAmount`.
pub fn parse_amount(value: Option<&Value>) -> LifecycleResult<Decimal> {
    let raw = match value {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => {
            return Err(ServiceOrderError::InvalidAmount(format!(
                "'{}' is not a number",
                other
            )))
        }
        None => {
            return Err(ServiceOrderError::InvalidAmount(
                "totalCost is required".to_string(),
            ))
        }
    };

    let amount = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ServiceOrderError::InvalidAmount(format!("'{}' is not a number", raw)))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ServiceOrderError::InvalidAmount(format!(
            "{} is negative",
            amount
        )));
    }

    let amount = amount.round_dp(2);
    if amount > MAX_AMOUNT {
        return Err(ServiceOrderError::InvalidAmount(format!(
            "{} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }

    Ok(amount)
}

pub struct ServiceOrderService {
    orders: Arc<dyn ServiceOrderStore>,
    vehicles: Arc<dyn VehicleStore>,
    hub: BroadcastHub,
}

impl ServiceOrderService {
    pub fn new(
        orders: Arc<dyn ServiceOrderStore>,
        vehicles: Arc<dyn VehicleStore>,
        hub: BroadcastHub,
    ) -> Self {
        Self {
            orders,
            vehicles,
            hub,
        }
    }

    /// Orden enviada por el mecánico: siempre `pending_approval` y costo 0
    pub async fn create(&self, request: CreateServiceOrderRequest) -> LifecycleResult<ServiceOrder> {
        let draft = self
            .validate_draft(request, ServiceStatus::PendingApproval, Decimal::ZERO)
            .await?;
        let order = self.orders.insert(draft).await?;

        info!(
            "🔧 Orden {} creada por mecánico {} ({})",
            order.id,
            order.mechanic_id,
            order.display_plate()
        );
        self.hub.publish(OrderEvent::created(order.clone()));
        Ok(order)
    }

    /// Orden creada por el administrador con estado y costo explícitos
    pub async fn create_direct(
        &self,
        request: DirectServiceOrderRequest,
    ) -> LifecycleResult<ServiceOrder> {
        let status = request.status.unwrap_or(ServiceStatus::Pending);
        let total_cost = match request.total_cost.as_ref() {
            Some(value) => parse_amount(Some(value))?,
            None => Decimal::ZERO,
        };
        let draft = self.validate_draft(request.draft, status, total_cost).await?;
        let order = self.orders.insert(draft).await?;

        info!("🗂️ Orden {} creada por administración con estado {}", order.id, order.status);
        self.hub.publish(OrderEvent::created(order.clone()));
        Ok(order)
    }

    /// Aprobación: costo final, estado `completed` y fecha de término
    pub async fn approve(
        &self,
        id: Uuid,
        request: ApproveServiceOrderRequest,
    ) -> LifecycleResult<ServiceOrder> {
        let current = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or(ServiceOrderError::NotFound(id))?;
        let total_cost = parse_amount(request.total_cost.as_ref())?;

        if !current.status.can_approve() {
            return Err(ServiceOrderError::InvalidTransition {
                from: current.status,
                to: ServiceStatus::Completed,
            });
        }

        let Some(order) = self.orders.complete(id, total_cost, Utc::now()).await? else {
            return Err(self.lost_race(id, ServiceStatus::Completed).await);
        };

        info!("✅ Orden {} aprobada por {}", order.id, order.total_cost);
        self.hub.publish(OrderEvent::updated(order.clone()));
        Ok(order)
    }

    /// Edición directa del administrador respetando la máquina de estados
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateServiceOrderRequest,
    ) -> LifecycleResult<ServiceOrder> {
        let current = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or(ServiceOrderError::NotFound(id))?;

        let next_status = request.status.unwrap_or(current.status);
        if !current.status.can_transition_to(next_status) {
            return Err(ServiceOrderError::InvalidTransition {
                from: current.status,
                to: next_status,
            });
        }

        let mut updated = current.clone();
        if let Some(description) = request.description {
            updated.description = non_blank(Some(description)).ok_or_else(|| {
                ServiceOrderError::InvalidOrder("description must not be empty".to_string())
            })?;
        }
        if let Some(vehicle_id) = request.vehicle_id {
            updated.vehicle_id = self.resolve_vehicle_id(Some(vehicle_id)).await?;
        }
        if let Some(temp_plate) = request.temp_plate {
            updated.temp_plate = non_blank(Some(temp_plate)).map(|plate| normalize_plate(&plate));
        }
        if request.notes.is_some() {
            updated.notes = request.notes;
        }
        if let Some(value) = request.total_cost.as_ref() {
            updated.total_cost = parse_amount(Some(value))?;
        }
        if updated.vehicle_id.is_none() && updated.temp_plate.is_none() {
            return Err(ServiceOrderError::InvalidOrder(
                "a vehicle or a temporary plate is required".to_string(),
            ));
        }

        updated.status = next_status;
        if next_status == ServiceStatus::Completed && updated.end_date.is_none() {
            updated.end_date = Some(Utc::now());
        }

        let Some(order) = self.orders.replace(current.status, &updated).await? else {
            return Err(self.lost_race(id, next_status).await);
        };

        info!("📝 Orden {} editada ({} → {})", order.id, current.status, order.status);
        self.hub.publish(OrderEvent::updated(order.clone()));
        Ok(order)
    }

    /// Borrado administrativo. No se retransmite.
    pub async fn delete(&self, id: Uuid) -> LifecycleResult<()> {
        if !self.orders.delete(id).await? {
            return Err(ServiceOrderError::NotFound(id));
        }
        info!("🗑️ Orden {} eliminada", id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> LifecycleResult<ServiceOrder> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or(ServiceOrderError::NotFound(id))
    }

    pub async fn list(&self) -> LifecycleResult<Vec<ServiceOrder>> {
        Ok(self.orders.list().await?)
    }

    pub async fn dashboard(&self) -> LifecycleResult<DashboardStats> {
        let summary = self.orders.summary().await?;
        let vehicles = self.vehicles.count().await?;

        Ok(DashboardStats {
            revenue: summary.revenue,
            active_os: summary.in_progress,
            pending_approval: summary.pending_approval,
            vehicles,
        })
    }

    async fn validate_draft(
        &self,
        request: CreateServiceOrderRequest,
        status: ServiceStatus,
        total_cost: Decimal,
    ) -> LifecycleResult<NewServiceOrder> {
        let description = non_blank(Some(request.description)).ok_or_else(|| {
            ServiceOrderError::InvalidOrder("description must not be empty".to_string())
        })?;
        let mechanic_id = non_blank(Some(request.mechanic_id)).ok_or_else(|| {
            ServiceOrderError::InvalidOrder("mechanicId is required".to_string())
        })?;
        let temp_plate = non_blank(request.temp_plate).map(|plate| normalize_plate(&plate));
        let vehicle_id = self.resolve_vehicle_id(request.vehicle_id).await?;

        if vehicle_id.is_none() && temp_plate.is_none() {
            return Err(ServiceOrderError::InvalidOrder(
                "a vehicle or a temporary plate is required".to_string(),
            ));
        }

        Ok(NewServiceOrder {
            description,
            vehicle_id,
            temp_plate,
            mechanic_id,
            notes: non_blank(request.notes),
            status,
            total_cost,
        })
    }

    /// Id de vehículo opcional que, si viene, debe existir
    async fn resolve_vehicle_id(&self, raw: Option<String>) -> LifecycleResult<Option<Uuid>> {
        let Some(raw) = non_blank(raw) else {
            return Ok(None);
        };
        let id = Uuid::parse_str(&raw).map_err(|_| {
            ServiceOrderError::InvalidOrder(format!("'{}' is not a valid vehicle id", raw))
        })?;

        match self.vehicles.find_by_id(id).await? {
            Some(_) => Ok(Some(id)),
            None => Err(ServiceOrderError::InvalidOrder(format!(
                "vehicle '{}' does not exist",
                id
            ))),
        }
    }

    /// La escritura condicional no aplicó: la orden desapareció o cambió de
    /// estado entre la lectura y la escritura.
    async fn lost_race(&self, id: Uuid, to: ServiceStatus) -> ServiceOrderError {
        warn!("⚠️ Orden {} cambió durante la operación", id);
        match self.orders.find_by_id(id).await {
            Ok(Some(order)) => ServiceOrderError::InvalidTransition {
                from: order.status,
                to,
            },
            Ok(None) => ServiceOrderError::NotFound(id),
            Err(e) => ServiceOrderError::Storage(e),
        }
    }
}
