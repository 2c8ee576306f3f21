//! Modelo de Part (inventario de piezas)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub markup: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Part {
    /// Stock en o por debajo del mínimo configurado
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    pub fn apply(&mut self, changes: PartChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(code) = changes.code {
            self.code = code;
        }
        if changes.category.is_some() {
            self.category = changes.category;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(min_quantity) = changes.min_quantity {
            self.min_quantity = min_quantity;
        }
        if let Some(purchase_price) = changes.purchase_price {
            self.purchase_price = purchase_price;
        }
        if let Some(markup) = changes.markup {
            self.markup = markup;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if changes.supplier.is_some() {
            self.supplier = changes.supplier;
        }
        if changes.location.is_some() {
            self.location = changes.location;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPart {
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub purchase_price: Decimal,
    pub markup: Decimal,
    pub price: Decimal,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PartChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub purchase_price: Option<Decimal>,
    pub markup: Option<Decimal>,
    pub price: Option<Decimal>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}
