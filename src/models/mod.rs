//! Modelos del sistema
//!
//! Entidades del taller tal como las devuelve el Record Store.

pub mod dashboard;
pub mod document;
pub mod part;
pub mod service_order;
pub mod vehicle;

pub use dashboard::DashboardStats;
pub use document::{DocumentCategory, NewDocument, WorkshopDocument};
pub use part::{NewPart, Part, PartChanges};
pub use service_order::{NewServiceOrder, ServiceOrder, ServiceStatus};
pub use vehicle::{NewVehicle, Vehicle, VehicleChanges, VehicleStatus};
