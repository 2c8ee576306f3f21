//! Services module
//!
//! Lógica de negocio de la aplicación. El gestor del ciclo de vida de las
//! órdenes de servicio valida, persiste y decide qué se retransmite.

pub mod service_order_service;

pub use service_order_service::ServiceOrderService;
