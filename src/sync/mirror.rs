//! Espejo local de las órdenes de servicio
//!
//! Caché del cliente, nunca fuente de verdad. La fusión es por id y es
//! idempotente y conmutativa: aplicar la respuesta HTTP y el evento del
//! canal en cualquier orden deja el mismo estado.

use std::collections::HashSet;
use uuid::Uuid;

use crate::models::ServiceOrder;
use crate::realtime::OrderEvent;

/// Resultado de aplicar un registro al espejo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
    /// Ya estaba, o el registro es más viejo que la entrada actual
    Ignored,
}

/// Lista ordenada de la más nueva a la más vieja (`startDate` desc)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderMirror {
    orders: Vec<ServiceOrder>,
}

impl OrderMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: Vec<ServiceOrder>) -> Self {
        let mut mirror = Self::new();
        mirror.replace_all(orders);
        mirror
    }

    /// Aplica un evento del canal.
    ///
    /// `order-created` solo inserta si el id no existe; `order-updated`
    /// reemplaza o inserta si se perdió la creación.
    pub fn apply_event(&mut self, event: &OrderEvent) -> MergeOutcome {
        match event {
            OrderEvent::OrderCreated { order, .. } => {
                if self.position(order.id).is_some() {
                    MergeOutcome::Ignored
                } else {
                    self.insert_sorted(order.clone());
                    MergeOutcome::Inserted
                }
            }
            OrderEvent::OrderUpdated { order } => self.upsert(order.clone()),
        }
    }

    /// Aplica el cuerpo de una respuesta HTTP exitosa del propio cliente
    pub fn apply_local(&mut self, order: ServiceOrder) -> MergeOutcome {
        self.upsert(order)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ServiceOrder> {
        self.position(id).map(|index| self.orders.remove(index))
    }

    /// Descarta todo y carga la colección recién leída del servidor
    pub fn replace_all(&mut self, mut orders: Vec<ServiceOrder>) {
        let mut seen = HashSet::new();
        orders.retain(|order| seen.insert(order.id));
        orders.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        self.orders = orders;
    }

    pub fn get(&self, id: Uuid) -> Option<&ServiceOrder> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceOrder> {
        self.orders.iter()
    }

    pub fn snapshot(&self) -> Vec<ServiceOrder> {
        self.orders.clone()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.orders.iter().position(|order| order.id == id)
    }

    fn upsert(&mut self, order: ServiceOrder) -> MergeOutcome {
        match self.position(order.id) {
            Some(index) => {
                let current = &self.orders[index];
                // El estado nunca retrocede: un registro con menos avance llegó tarde
                if order.status.progress() < current.status.progress() {
                    return MergeOutcome::Ignored;
                }
                if *current == order {
                    return MergeOutcome::Ignored;
                }
                self.orders.remove(index);
                self.insert_sorted(order);
                MergeOutcome::Replaced
            }
            None => {
                self.insert_sorted(order);
                MergeOutcome::Inserted
            }
        }
    }

    fn insert_sorted(&mut self, order: ServiceOrder) {
        let index = self
            .orders
            .partition_point(|existing| existing.start_date >= order.start_date);
        self.orders.insert(index, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceStatus;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn order(description: &str, minutes_ago: i64) -> ServiceOrder {
        ServiceOrder {
            id: Uuid::new_v4(),
            description: description.to_string(),
            vehicle_id: None,
            temp_plate: Some("ABC1D23".to_string()),
            mechanic_id: "m1".to_string(),
            total_cost: Decimal::ZERO,
            notes: None,
            start_date: Utc::now() - Duration::minutes(minutes_ago),
            end_date: None,
            status: ServiceStatus::PendingApproval,
            vehicle: None,
        }
    }

    fn approved(mut order: ServiceOrder) -> ServiceOrder {
        order.status = ServiceStatus::Completed;
        order.total_cost = Decimal::new(35000, 2);
        order.end_date = Some(Utc::now());
        order
    }

    #[test]
    fn test_created_event_is_idempotent() {
        let created = OrderEvent::created(order("Troca de óleo", 0));

        let mut once = OrderMirror::new();
        once.apply_event(&created);

        let mut twice = OrderMirror::new();
        assert_eq!(twice.apply_event(&created), MergeOutcome::Inserted);
        assert_eq!(twice.apply_event(&created), MergeOutcome::Ignored);

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_created_event_does_not_overwrite_existing_entry() {
        let original = order("Troca de óleo", 0);
        let done = approved(original.clone());

        let mut mirror = OrderMirror::new();
        mirror.apply_local(done.clone());
        mirror.apply_event(&OrderEvent::created(original));

        assert_eq!(mirror.get(done.id), Some(&done));
    }

    #[test]
    fn test_http_response_and_broadcast_commute() {
        let created = order("Alinhamento", 0);
        let done = approved(created.clone());

        let mut http_first = OrderMirror::new();
        http_first.apply_local(created.clone());
        http_first.apply_event(&OrderEvent::created(created.clone()));
        http_first.apply_local(done.clone());
        http_first.apply_event(&OrderEvent::updated(done.clone()));

        let mut events_first = OrderMirror::new();
        events_first.apply_event(&OrderEvent::created(created.clone()));
        events_first.apply_event(&OrderEvent::updated(done.clone()));
        events_first.apply_local(created);
        events_first.apply_local(done.clone());

        assert_eq!(http_first, events_first);
        assert_eq!(events_first.get(done.id).map(|o| o.status), Some(ServiceStatus::Completed));
    }

    #[test]
    fn test_stale_admin_edits_do_not_move_status_back() {
        let mut pending = order("Embreagem", 0);
        pending.status = ServiceStatus::Pending;
        let mut started = pending.clone();
        started.status = ServiceStatus::InProgress;
        started.notes = Some("Peça chegou".to_string());

        let mut in_order = OrderMirror::new();
        in_order.apply_event(&OrderEvent::updated(pending.clone()));
        in_order.apply_event(&OrderEvent::updated(started.clone()));

        let mut reversed = OrderMirror::new();
        reversed.apply_event(&OrderEvent::updated(started.clone()));
        assert_eq!(
            reversed.apply_event(&OrderEvent::updated(pending)),
            MergeOutcome::Ignored
        );

        assert_eq!(in_order, reversed);
        assert_eq!(reversed.get(started.id), Some(&started));
    }

    #[test]
    fn test_updated_event_inserts_when_create_was_missed() {
        let mut mirror = OrderMirror::new();
        let done = approved(order("Freios", 5));
        assert_eq!(mirror.apply_event(&OrderEvent::updated(done.clone())), MergeOutcome::Inserted);
        assert!(mirror.contains(done.id));
    }

    #[test]
    fn test_sorted_newest_first() {
        let old = order("old", 60);
        let middle = order("middle", 30);
        let fresh = order("fresh", 0);

        let mut mirror = OrderMirror::new();
        mirror.apply_local(middle.clone());
        mirror.apply_event(&OrderEvent::created(fresh.clone()));
        mirror.apply_event(&OrderEvent::updated(old.clone()));

        let ids: Vec<Uuid> = mirror.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![fresh.id, middle.id, old.id]);
    }

    #[test]
    fn test_remove_and_replace_all() {
        let a = order("a", 10);
        let b = order("b", 0);
        let mut mirror = OrderMirror::from_orders(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.iter().next().map(|o| o.id), Some(b.id));

        assert!(mirror.remove(a.id).is_some());
        assert!(mirror.remove(a.id).is_none());

        mirror.replace_all(Vec::new());
        assert!(mirror.is_empty());
    }
}
