//! Modelo de Vehicle
//!
//! Vehículos registrados del taller. Las órdenes de servicio los referencian
//! por id o, antes del registro formal, por una placa temporal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Estado del vehículo dentro del taller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleStatus {
    InService,
    #[default]
    Waiting,
    Ready,
    Delivered,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::InService => "in-service",
            VehicleStatus::Waiting => "waiting",
            VehicleStatus::Ready => "ready",
            VehicleStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-service" => Ok(VehicleStatus::InService),
            "waiting" => Ok(VehicleStatus::Waiting),
            "ready" => Ok(VehicleStatus::Ready),
            "delivered" => Ok(VehicleStatus::Delivered),
            other => Err(format!("unknown vehicle status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String,
    pub model: String,
    pub brand: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

/// Datos para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub plate: String,
    pub model: String,
    pub brand: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: VehicleStatus,
}

/// Cambios parciales sobre un vehículo existente
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub plate: Option<String>,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl Vehicle {
    pub fn apply(&mut self, changes: VehicleChanges) {
        if let Some(plate) = changes.plate {
            self.plate = plate;
        }
        if let Some(model) = changes.model {
            self.model = model;
        }
        if let Some(brand) = changes.brand {
            self.brand = brand;
        }
        if changes.year.is_some() {
            self.year = changes.year;
        }
        if changes.color.is_some() {
            self.color = changes.color;
        }
        if changes.owner_name.is_some() {
            self.owner_name = changes.owner_name;
        }
        if changes.owner_phone.is_some() {
            self.owner_phone = changes.owner_phone;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}
