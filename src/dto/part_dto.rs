use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NewPart, PartChanges};
use crate::utils::validation::validate_non_negative;

// Request para dar de alta una pieza en el inventario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_quantity: i32,
    #[validate(custom = "validate_non_negative")]
    pub purchase_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub markup: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

impl From<CreatePartRequest> for NewPart {
    fn from(request: CreatePartRequest) -> Self {
        NewPart {
            name: request.name,
            code: request.code,
            category: request.category,
            quantity: request.quantity,
            min_quantity: request.min_quantity,
            purchase_price: request.purchase_price.unwrap_or_default(),
            markup: request.markup.unwrap_or_default(),
            price: request.price.unwrap_or_default(),
            supplier: request.supplier,
            location: request.location,
        }
    }
}

// Request para actualizar una pieza
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    #[validate(custom = "validate_non_negative")]
    pub purchase_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub markup: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

impl From<UpdatePartRequest> for PartChanges {
    fn from(request: UpdatePartRequest) -> Self {
        PartChanges {
            name: request.name,
            code: request.code,
            category: request.category,
            quantity: request.quantity,
            min_quantity: request.min_quantity,
            purchase_price: request.purchase_price,
            markup: request.markup,
            price: request.price,
            supplier: request.supplier,
            location: request.location,
        }
    }
}
