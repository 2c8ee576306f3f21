//! Broadcast Hub
//!
//! Relay en proceso sobre `tokio::sync::broadcast`. El hub no guarda estado
//! de negocio: solo el conjunto efímero de receptores conectados.

use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::events::{EventName, OrderEvent};

/// Mensaje entregado a un suscriptor
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    Event(OrderEvent),
    /// El suscriptor se quedó atrás y perdió `n` eventos; debe resincronizar
    Lagged(u64),
}

#[derive(Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<OrderEvent>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publica un evento a todos los suscriptores actuales.
    ///
    /// Fire-and-forget: devuelve cuántos receptores lo recibieron y nunca
    /// falla. Sin receptores el evento se pierde y solo se registra.
    pub fn publish(&self, event: OrderEvent) -> usize {
        let name = event.name();
        let order_id = event.order().id;
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!("📡 Evento {} para orden {} entregado a {} suscriptores", name, order_id, receivers);
                receivers
            }
            Err(_) => {
                warn!("📭 Evento {} para orden {} sin suscriptores, descartado", name, order_id);
                0
            }
        }
    }

    /// Registra un suscriptor. Solo recibe eventos publicados después de
    /// esta llamada. Un filtro vacío equivale a todos los eventos.
    pub fn subscribe(&self, events: &[EventName]) -> HubSubscription {
        let filter = if events.is_empty() {
            EventName::ALL.to_vec()
        } else {
            events.to_vec()
        };
        HubSubscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}

pub struct HubSubscription {
    receiver: broadcast::Receiver<OrderEvent>,
    filter: Vec<EventName>,
}

impl HubSubscription {
    /// Espera el próximo mensaje. `None` cuando el hub se cerró.
    pub async fn recv(&mut self) -> Option<HubMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.contains(&event.name()) => {
                    return Some(HubMessage::Event(event));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("🐢 Suscriptor atrasado, {} eventos perdidos", skipped);
                    return Some(HubMessage::Lagged(skipped));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = HubMessage> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            subscription.recv().await.map(|message| (message, subscription))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service_order::{ServiceOrder, ServiceStatus};
    use chrono::Utc;
    use futures::StreamExt;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn order(description: &str) -> ServiceOrder {
        ServiceOrder {
            id: Uuid::new_v4(),
            description: description.to_string(),
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

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let hub = BroadcastHub::new(8);
        assert_eq!(hub.publish(OrderEvent::created(order("a"))), 0);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_only_events_after_subscribe_are_delivered() {
        let hub = BroadcastHub::new(8);
        hub.publish(OrderEvent::created(order("before")));

        let mut subscription = hub.subscribe(&[]);
        let after = OrderEvent::created(order("after"));
        assert_eq!(hub.publish(after.clone()), 1);

        assert_eq!(subscription.recv().await, Some(HubMessage::Event(after)));
    }

    #[tokio::test]
    async fn test_filter_by_event_name_and_call_order() {
        let hub = BroadcastHub::new(8);
        let mut updates = hub.subscribe(&[EventName::OrderUpdated]);

        let first = order("first");
        hub.publish(OrderEvent::created(first.clone()));
        hub.publish(OrderEvent::updated(first.clone()));
        hub.publish(OrderEvent::updated(order("second")));

        match updates.recv().await {
            Some(HubMessage::Event(event)) => {
                assert_eq!(event.name(), EventName::OrderUpdated);
                assert_eq!(event.order().id, first.id);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        match updates.recv().await {
            Some(HubMessage::Event(event)) => assert_eq!(event.order().description, "second"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lagging_subscriber_is_told_to_resync() {
        let hub = BroadcastHub::new(2);
        let mut subscription = hub.subscribe(&[]);
        for i in 0..5 {
            hub.publish(OrderEvent::created(order(&format!("o{}", i))));
        }
        assert!(matches!(subscription.recv().await, Some(HubMessage::Lagged(_))));
    }

    #[tokio::test]
    async fn test_dropped_subscription_leaves_subscriber_set() {
        let hub = BroadcastHub::new(8);
        let subscription = hub.subscribe(&[]);
        assert_eq!(hub.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_adapter() {
        let hub = BroadcastHub::new(8);
        let stream = hub.subscribe(&[]).into_stream();
        tokio::pin!(stream);
        let event = OrderEvent::updated(order("x"));
        hub.publish(event.clone());
        assert_eq!(stream.next().await, Some(HubMessage::Event(event)));
    }
}
