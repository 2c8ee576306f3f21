//! Eventos del dominio publicados por el gestor del ciclo de vida

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::service_order::ServiceOrder;

/// Nombre del evento SSE que avisa a un cliente que perdió eventos
pub const RESYNC_EVENT: &str = "resync";

/// Nombres de evento del canal. Solo existen estos dos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    OrderCreated,
    OrderUpdated,
}

impl EventName {
    pub const ALL: [EventName; 2] = [EventName::OrderCreated, EventName::OrderUpdated];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::OrderCreated => "order-created",
            EventName::OrderUpdated => "order-updated",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "order-created" => Ok(EventName::OrderCreated),
            "order-updated" => Ok(EventName::OrderUpdated),
            other => Err(format!("unknown event '{}'", other)),
        }
    }
}

/// Lo mínimo que necesita el presentador de notificaciones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotice {
    pub description: String,
    pub plate: String,
}

/// Evento etiquetado del canal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum OrderEvent {
    OrderCreated { order: ServiceOrder, notice: OrderNotice },
    OrderUpdated { order: ServiceOrder },
}

impl OrderEvent {
    pub fn created(order: ServiceOrder) -> Self {
        let notice = OrderNotice {
            description: order.description.clone(),
            plate: order.display_plate(),
        };
        OrderEvent::OrderCreated { order, notice }
    }

    pub fn updated(order: ServiceOrder) -> Self {
        OrderEvent::OrderUpdated { order }
    }

    pub fn name(&self) -> EventName {
        match self {
            OrderEvent::OrderCreated { .. } => EventName::OrderCreated,
            OrderEvent::OrderUpdated { .. } => EventName::OrderUpdated,
        }
    }

    pub fn order(&self) -> &ServiceOrder {
        match self {
            OrderEvent::OrderCreated { order, .. } | OrderEvent::OrderUpdated { order } => order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service_order::ServiceStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn order() -> ServiceOrder {
        ServiceOrder {
            id: Uuid::new_v4(),
            description: "Troca de óleo".to_string(),
            vehicle_id: None,
            temp_plate: Some("ABC1D23".to_string()),
            mechanic_id: "m1".to_string(),
            total_cost: Decimal::ZERO,
            notes: None,
            start_date: Utc::now(),
            end_date: None,
            status: ServiceStatus::PendingApproval,
            vehicle: None,
        }
    }

    #[test]
    fn test_created_event_wire_shape() {
        let event = OrderEvent::created(order());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "order-created");
        assert_eq!(json["notice"]["plate"], "ABC1D23");
        assert_eq!(json["notice"]["description"], "Troca de óleo");
        assert_eq!(json["order"]["status"], "pending_approval");

        let back: OrderEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_malformed_event_is_rejected() {
        let json = serde_json::json!({ "event": "order-deleted", "order": {} });
        assert!(serde_json::from_value::<OrderEvent>(json).is_err());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(OrderEvent::updated(order()).name(), EventName::OrderUpdated);
        assert_eq!("order-created".parse::<EventName>().unwrap(), EventName::OrderCreated);
        assert!("novo-servico".parse::<EventName>().is_err());
    }
}
