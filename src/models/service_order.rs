//! Modelo de orden de servicio
//!
//! La orden de servicio es la entidad central del taller. Su estado sigue
//! una máquina de estados finita; `completed` y `cancelled` son terminales.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::vehicle::Vehicle;

/// Estado de la orden de servicio (strings exactos del protocolo)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    #[serde(rename = "pending_approval")]
    PendingApproval,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 5] = [
        ServiceStatus::PendingApproval,
        ServiceStatus::Pending,
        ServiceStatus::InProgress,
        ServiceStatus::Completed,
        ServiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::PendingApproval => "pending_approval",
            ServiceStatus::Pending => "pending",
            ServiceStatus::InProgress => "in-progress",
            ServiceStatus::Completed => "completed",
            ServiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceStatus::Completed | ServiceStatus::Cancelled)
    }

    /// Avance dentro del ciclo de vida. Ninguna transición válida lo reduce,
    /// así que un registro con menor avance es una entrega atrasada.
    pub fn progress(&self) -> u8 {
        match self {
            ServiceStatus::PendingApproval => 0,
            ServiceStatus::Pending => 1,
            ServiceStatus::InProgress => 2,
            ServiceStatus::Completed | ServiceStatus::Cancelled => 3,
        }
    }

    /// Transición permitida por la aprobación del administrador
    pub fn can_approve(&self) -> bool {
        !self.is_terminal()
    }

    /// Transición permitida por una edición directa del administrador.
    /// Mantener el mismo estado siempre es válido fuera de los terminales.
    pub fn can_transition_to(&self, next: ServiceStatus) -> bool {
        use ServiceStatus::*;

        if self.is_terminal() {
            return false;
        }
        if *self == next {
            return true;
        }
        match (self, next) {
            (_, Cancelled) => true,
            (Pending, InProgress) => true,
            (Pending, Completed) | (PendingApproval, Completed) | (InProgress, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown service status '{}'", s))
    }
}

/// Orden de servicio tal como la devuelve el Record Store, con el vehículo
/// resuelto embebido para mostrarlo sin otra consulta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: Uuid,
    pub description: String,
    pub vehicle_id: Option<Uuid>,
    pub temp_plate: Option<String>,
    pub mechanic_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub notes: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: ServiceStatus,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
}

impl ServiceOrder {
    /// Etiqueta que se muestra en la notificación: placa temporal si existe,
    /// si no la placa del vehículo registrado.
    pub fn display_plate(&self) -> String {
        self.temp_plate
            .as_deref()
            .filter(|plate| !plate.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.vehicle.as_ref().map(|v| v.plate.clone()))
            .unwrap_or_else(|| "Cadastrada".to_string())
    }
}

/// Datos ya validados que el Record Store necesita para insertar una orden.
/// El id y las marcas de tiempo los genera el store.
#[derive(Debug, Clone)]
pub struct NewServiceOrder {
    pub description: String,
    pub vehicle_id: Option<Uuid>,
    pub temp_plate: Option<String>,
    pub mechanic_id: String,
    pub notes: Option<String>,
    pub status: ServiceStatus,
    pub total_cost: Decimal,
}
