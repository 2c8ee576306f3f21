use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ServiceStatus;

/// Borrador de orden enviado por el mecánico (`POST /services`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_plate: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mechanic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Orden creada directamente por el administrador (`POST /services/direct`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectServiceOrderRequest {
    #[serde(flatten)]
    pub draft: CreateServiceOrderRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Value>,
}

/// `PATCH /services/:id/approve`. El monto llega sin tipar para poder
/// responder `InvalidAmount` en vez de un rechazo de deserialización.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveServiceOrderRequest {
    #[serde(default)]
    pub total_cost: Option<Value>,
}

/// Edición directa del administrador (`PUT /services/:id`).
/// En `vehicleId`/`tempPlate` un string vacío borra el valor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_accepts_partial_body() {
        let request: CreateServiceOrderRequest = serde_json::from_value(json!({
            "tempPlate": "ABC1D23",
            "description": "Troca de óleo",
            "mechanicId": "m1"
        }))
        .unwrap();
        assert_eq!(request.temp_plate.as_deref(), Some("ABC1D23"));
        assert!(request.vehicle_id.is_none());
        assert!(request.notes.is_none());

        let empty: CreateServiceOrderRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.description.is_empty());
    }

    #[test]
    fn test_direct_request_flattens_draft() {
        let request: DirectServiceOrderRequest = serde_json::from_value(json!({
            "tempPlate": "ABC1D23",
            "description": "Revisão",
            "mechanicId": "admin",
            "status": "in-progress",
            "totalCost": 120
        }))
        .unwrap();
        assert_eq!(request.draft.description, "Revisão");
        assert_eq!(request.status, Some(ServiceStatus::InProgress));
        assert_eq!(request.total_cost, Some(json!(120)));
    }
}
