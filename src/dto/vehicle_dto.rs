use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NewVehicle, VehicleChanges, VehicleStatus};
use crate::utils::validation::normalize_plate;

// Request para crear un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub plate: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        NewVehicle {
            plate: normalize_plate(&request.plate),
            model: request.model,
            brand: request.brand,
            year: request.year,
            color: request.color,
            owner_name: request.owner_name,
            owner_phone: request.owner_phone,
            status: request.status.unwrap_or_default(),
        }
    }
}

// Request para actualizar un vehículo
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub plate: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub color: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl From<UpdateVehicleRequest> for VehicleChanges {
    fn from(request: UpdateVehicleRequest) -> Self {
        VehicleChanges {
            plate: request.plate.as_deref().map(normalize_plate),
            model: request.model,
            brand: request.brand,
            year: request.year,
            color: request.color,
            owner_name: request.owner_name,
            owner_phone: request.owner_phone,
            status: request.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vehicle_request_validation() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "plate": "",
            "model": "Onix",
            "brand": "Chevrolet",
            "year": 1850
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("plate"));
        assert!(fields.contains_key("year"));
    }

    #[test]
    fn test_plate_is_normalized() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "plate": " abc1d23 ",
            "model": "Onix",
            "brand": "Chevrolet",
            "status": "in-service"
        }))
        .unwrap();
        let vehicle = NewVehicle::from(request);
        assert_eq!(vehicle.plate, "ABC1D23");
        assert_eq!(vehicle.status, VehicleStatus::InService);
    }
}
