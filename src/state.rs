//! Shared application state
//!
//! Estado compartido que se pasa a través del router de Axum. Los stores
//! son trait objects para poder elegir PostgreSQL o memoria al arrancar.

use std::sync::Arc;
use tokio::sync::watch;

use crate::config::EnvironmentConfig;
use crate::realtime::BroadcastHub;
use crate::repositories::{
    DocumentStore, MemoryStore, PartStore, PgDocumentRepository, PgPartRepository,
    PgServiceOrderRepository, PgVehicleRepository, ServiceOrderStore, VehicleStore,
};
use crate::services::ServiceOrderService;
use sqlx::PgPool;

/// Conjunto de stores del Record Store
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn ServiceOrderStore>,
    pub vehicles: Arc<dyn VehicleStore>,
    pub parts: Arc<dyn PartStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            orders: Arc::new(PgServiceOrderRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            parts: Arc::new(PgPartRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            orders: store.clone(),
            vehicles: store.clone(),
            parts: store.clone(),
            documents: store,
        }
    }
}

/// Aviso de apagado compartido. Los canales de eventos abiertos terminan
/// al dispararse, así el servidor puede cerrar sus conexiones.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Se resuelve cuando se dispara el apagado (de inmediato si ya ocurrió)
    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub stores: Stores,
    pub hub: BroadcastHub,
    pub service_orders: Arc<ServiceOrderService>,
    pub shutdown: ShutdownSignal,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, stores: Stores) -> Self {
        let hub = BroadcastHub::new(config.event_channel_capacity);
        let service_orders = Arc::new(ServiceOrderService::new(
            stores.orders.clone(),
            stores.vehicles.clone(),
            hub.clone(),
        ));

        Self {
            config,
            stores,
            hub,
            service_orders,
            shutdown: ShutdownSignal::new(),
        }
    }
}
