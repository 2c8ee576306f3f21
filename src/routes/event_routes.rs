//! Canal de eventos por Server-Sent Events
//!
//! Cada conexión es un suscriptor del hub. El campo `event:` lleva el nombre
//! del evento y `data:` el `OrderEvent` serializado.

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tracing::{info, warn};

use crate::realtime::{EventName, HubMessage, RESYNC_EVENT};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Lista separada por comas; vacío = todos
    pub events: Option<String>,
}

pub fn create_event_router() -> Router<AppState> {
    Router::new().route("/events", get(stream_events))
}

fn parse_event_names(raw: Option<&str>) -> AppResult<Vec<EventName>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<EventName>().map_err(|e| bad_request_error(&e)))
        .collect()
}

fn to_sse_event(message: HubMessage) -> Event {
    match message {
        HubMessage::Event(event) => {
            let name = event.name();
            match Event::default().event(name.as_str()).json_data(&event) {
                Ok(sse_event) => sse_event,
                Err(e) => {
                    // El cliente no puede aplicar un evento ilegible; que resincronice
                    warn!("⚠️ No se pudo serializar el evento {}: {}", name, e);
                    Event::default().event(RESYNC_EVENT).data("serialization")
                }
            }
        }
        HubMessage::Lagged(skipped) => Event::default().event(RESYNC_EVENT).data(skipped.to_string()),
    }
}

async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let names = parse_event_names(query.events.as_deref())?;

    // Suscribir antes de responder: el cliente solo ve eventos posteriores
    let subscription = state.hub.subscribe(&names);
    info!(
        "🔌 Cliente conectado al canal de eventos ({} suscriptores)",
        state.hub.subscriber_count()
    );

    // El apagado corta el stream; si no, la conexión mantendría vivo al servidor
    let shutdown = state.shutdown.clone();
    let stream = subscription
        .into_stream()
        .take_until(async move { shutdown.wait().await })
        .map(|message| Ok::<_, Infallible>(to_sse_event(message)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(state.config.sse_keep_alive)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_names() {
        assert!(parse_event_names(None).unwrap().is_empty());
        assert_eq!(
            parse_event_names(Some("order-created, order-updated")).unwrap(),
            vec![EventName::OrderCreated, EventName::OrderUpdated]
        );
        assert!(parse_event_names(Some("order-deleted")).is_err());
    }
}
