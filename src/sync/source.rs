//! Interfaz de suscripción a eventos
//!
//! El cliente depende solo de `EventSource`; el transporte (hub en proceso,
//! SSE, lo que venga) se inyecta sin tocar la lógica de fusión.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::ClientResult;
use crate::realtime::{BroadcastHub, EventName, HubMessage, OrderEvent};

/// Lo que un transporte entrega al manejador
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSignal {
    Event(OrderEvent),
    /// Se perdieron eventos; hay que releer la colección
    Resync,
    /// El canal terminó; no llegará nada más por esta suscripción
    Closed,
}

pub type EventHandler = Arc<dyn Fn(ChannelSignal) + Send + Sync>;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Registra `handler` para los eventos indicados (vacío = todos).
    ///
    /// Al volver, la suscripción ya está activa en el servidor: cualquier
    /// evento publicado después llega al manejador.
    async fn subscribe(
        &self,
        events: &[EventName],
        handler: EventHandler,
    ) -> ClientResult<Subscription>;
}

/// Token de baja. Soltarlo también corta la entrega.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Fuente en proceso, directamente sobre el `BroadcastHub`
#[derive(Clone)]
pub struct HubEventSource {
    hub: BroadcastHub,
}

impl HubEventSource {
    pub fn new(hub: BroadcastHub) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventSource for HubEventSource {
    async fn subscribe(
        &self,
        events: &[EventName],
        handler: EventHandler,
    ) -> ClientResult<Subscription> {
        let mut subscription = self.hub.subscribe(events);
        debug!("🔌 Suscripción en proceso a {:?}", events);

        let task = tokio::spawn(async move {
            loop {
                match subscription.recv().await {
                    Some(HubMessage::Event(event)) => handler(ChannelSignal::Event(event)),
                    Some(HubMessage::Lagged(skipped)) => {
                        warn!("🐢 {} eventos perdidos, pidiendo resincronización", skipped);
                        handler(ChannelSignal::Resync);
                    }
                    None => {
                        handler(ChannelSignal::Closed);
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceOrder, ServiceStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn order() -> ServiceOrder {
        ServiceOrder {
            id: Uuid::new_v4(),
            description: "Troca de óleo".to_string(),
            vehicle_id: None,
            temp_plate: Some("ABC1D23".to_string()),
            mechanic_id: "m1".to_string(),
            total_cost: Decimal::ZERO,
            notes: None,
            start_date: Utc::now(),
            end_date: None,
            status: ServiceStatus::PendingApproval,
            vehicle: None,
        }
    }

    fn channel_handler() -> (EventHandler, mpsc::UnboundedReceiver<ChannelSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler: EventHandler = Arc::new(move |signal| {
            let _ = tx.send(signal);
        });
        (handler, rx)
    }

    #[tokio::test]
    async fn test_hub_source_delivers_events() {
        let hub = BroadcastHub::new(8);
        let source = HubEventSource::new(hub.clone());
        let (handler, mut rx) = channel_handler();

        let subscription = source.subscribe(&[], handler).await.unwrap();
        assert!(subscription.is_active());

        let event = OrderEvent::created(order());
        assert_eq!(hub.publish(event.clone()), 1);
        assert_eq!(rx.recv().await, Some(ChannelSignal::Event(event)));
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = BroadcastHub::new(8);
        let source = HubEventSource::new(hub.clone());
        let (handler, mut rx) = channel_handler();

        let subscription = source.subscribe(&[], handler).await.unwrap();
        subscription.unsubscribe();
        tokio::task::yield_now().await;

        hub.publish(OrderEvent::created(order()));
        // El manejador se soltó junto con la tarea
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_lag_becomes_resync() {
        let hub = BroadcastHub::new(1);
        let source = HubEventSource::new(hub.clone());
        let (handler, mut rx) = channel_handler();
        let _subscription = source.subscribe(&[], handler).await.unwrap();

        // Publicar sin ceder el runtime desborda el buffer del suscriptor
        for _ in 0..4 {
            hub.publish(OrderEvent::created(order()));
        }
        let mut saw_resync = false;
        while let Ok(Some(signal)) =
            tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await
        {
            if signal == ChannelSignal::Resync {
                saw_resync = true;
                break;
            }
        }
        assert!(saw_resync);
    }
}
