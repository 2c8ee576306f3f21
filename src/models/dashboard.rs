//! Estadísticas agregadas para el panel del administrador

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(rename = "activeOS")]
    pub active_os: i64,
    pub pending_approval: i64,
    pub vehicles: i64,
}
