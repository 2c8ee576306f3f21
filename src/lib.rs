//! Backend del taller: ciclo de vida de las órdenes de servicio con
//! sincronización en vivo entre clientes.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
pub mod utils;

pub use routes::create_router;
pub use state::{AppState, ShutdownSignal, Stores};
