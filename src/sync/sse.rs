//! Fuente de eventos sobre Server-Sent Events (`GET /events`)

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::error::{ClientError, ClientResult};
use super::source::{ChannelSignal, EventHandler, EventSource, Subscription};
use crate::realtime::{EventName, OrderEvent, RESYNC_EVENT};

/// Un bloque `event:`/`data:` ya completo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Parser incremental de SSE. Los trozos de red pueden cortar un bloque
/// (o un carácter UTF-8) en cualquier punto.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega bytes y devuelve los bloques completos
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(frame) = parse_block(&String::from_utf8_lossy(&block[..end])) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn parse_block(block: &str) -> Option<SseFrame> {
    let mut frame = SseFrame::default();
    let mut data_lines = Vec::new();

    for line in block.lines() {
        // Comentario (keep-alive)
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => frame.event = Some(value.to_string()),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if frame.event.is_none() && data_lines.is_empty() {
        return None;
    }
    frame.data = data_lines.join("\n");
    Some(frame)
}

fn to_signal(frame: SseFrame) -> ChannelSignal {
    if frame.event.as_deref() == Some(RESYNC_EVENT) {
        return ChannelSignal::Resync;
    }
    match serde_json::from_str::<OrderEvent>(&frame.data) {
        Ok(event) => ChannelSignal::Event(event),
        Err(e) => {
            // Un evento ilegible no se ignora: se relee la colección
            warn!("⚠️ Evento {:?} ilegible ({}), resincronizando", frame.event, e);
            ChannelSignal::Resync
        }
    }
}

/// Cliente SSE contra el backend
#[derive(Clone)]
pub struct SseEventSource {
    http: reqwest::Client,
    base_url: String,
}

impl SseEventSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn subscribe(
        &self,
        events: &[EventName],
        handler: EventHandler,
    ) -> ClientResult<Subscription> {
        let mut request = self
            .http
            .get(format!("{}/events", self.base_url))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if !events.is_empty() {
            let names: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
            request = request.query(&[("events", names.join(","))]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        info!("🔌 Conectado al canal de eventos {}/events", self.base_url);

        let task = tokio::spawn(async move {
            let mut parser = SseParser::new();
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        for frame in parser.feed(&bytes) {
                            handler(to_signal(frame));
                        }
                    }
                    Err(e) => {
                        warn!("🔌 Canal de eventos interrumpido: {}", e);
                        break;
                    }
                }
            }
            debug!("🔌 Canal de eventos cerrado");
            handler(ChannelSignal::Closed);
        });

        Ok(Subscription::new(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_handles_split_frames_and_comments() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b":keep-alive\n\nevent: order-cre").is_empty());

        let frames = parser.feed(b"ated\ndata: {\"a\":1}\n\nevent: resync\ndata: 3\n\n");
        assert_eq!(
            frames,
            vec![
                SseFrame {
                    event: Some("order-created".to_string()),
                    data: "{\"a\":1}".to_string(),
                },
                SseFrame {
                    event: Some("resync".to_string()),
                    data: "3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parser_accepts_crlf_and_multiline_data() {
        let mut parser = SseParser::new();
        let frames = parser.feed(b"data: line1\r\ndata: line2\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "line1\nline2");
    }

    #[test]
    fn test_malformed_payload_triggers_resync() {
        let frame = SseFrame {
            event: Some("order-created".to_string()),
            data: "{\"event\":\"order-deleted\"}".to_string(),
        };
        assert_eq!(to_signal(frame), ChannelSignal::Resync);
        let lag = SseFrame {
            event: Some(RESYNC_EVENT.to_string()),
            data: "5".to_string(),
        };
        assert_eq!(to_signal(lag), ChannelSignal::Resync);
    }
}
