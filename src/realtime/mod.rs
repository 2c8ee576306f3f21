//! Canal de tiempo real
//!
//! Eventos de órdenes de servicio y el hub en proceso que los retransmite a
//! los clientes conectados. No hay durabilidad ni replay.

pub mod events;
pub mod hub;

pub use events::{EventName, OrderEvent, OrderNotice, RESYNC_EVENT};
pub use hub::{BroadcastHub, HubMessage, HubSubscription};
