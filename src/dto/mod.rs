//! Data Transfer Objects
//!
//! Cuerpos JSON que entran por la API. Los mismos tipos los usa el cliente
//! de sincronización para hablar con el servidor.

pub mod document_dto;
pub mod part_dto;
pub mod service_order_dto;
pub mod vehicle_dto;
