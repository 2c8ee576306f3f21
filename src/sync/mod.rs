//! Capa de sincronización del cliente

pub mod client;
pub mod error;
pub mod mirror;
pub mod source;
pub mod sse;

pub use client::{BackoffConfig, ClientConfig, ClientRole, SyncClient};
pub use error::{ClientError, ClientResult};
pub use mirror::{MergeOutcome, OrderMirror};
pub use source::{ChannelSignal, EventHandler, EventSource, HubEventSource, Subscription};
pub use sse::{SseEventSource, SseFrame, SseParser};
