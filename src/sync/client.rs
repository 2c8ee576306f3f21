//! Cliente de sincronización
//!
//! Mantiene un espejo local de las órdenes y lo reconcilia con el servidor
//! por dos caminos: las respuestas HTTP de las escrituras propias y los
//! eventos del canal. La única recuperación tras una desconexión es releer
//! la colección completa.

use rand::Rng;
use reqwest::{Method, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::{ClientError, ClientResult};
use super::mirror::{MergeOutcome, OrderMirror};
use super::source::{ChannelSignal, EventHandler, EventSource, Subscription};
use crate::dto::service_order_dto::{
    ApproveServiceOrderRequest, CreateServiceOrderRequest, DirectServiceOrderRequest,
    UpdateServiceOrderRequest,
};
use crate::models::ServiceOrder;
use crate::realtime::{EventName, OrderEvent, OrderNotice};

/// Rol del usuario del cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    /// Recibe avisos de órdenes nuevas
    Admin,
    Mechanic,
}

/// Reintentos de reconexión del canal de eventos
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
    /// Fracción del retardo sumada al azar (0.0 = sin jitter)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(10),
            jitter: 0.3,
        }
    }
}

impl BackoffConfig {
    /// Retardo del intento `attempt` (desde 0)
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self
            .initial
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
            .min(self.max);
        if self.jitter <= 0.0 {
            return base;
        }
        let factor = rand::thread_rng().gen_range(0.0..=self.jitter);
        base + base.mul_f64(factor)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub role: ClientRole,
    pub backoff: BackoffConfig,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, role: ClientRole) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            role,
            backoff: BackoffConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

struct Inner {
    http: reqwest::Client,
    config: ClientConfig,
    source: Arc<dyn EventSource>,
    mirror: RwLock<OrderMirror>,
    notices: broadcast::Sender<OrderNotice>,
}

pub struct SyncClient {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncClient {
    pub fn new(config: ClientConfig, source: Arc<dyn EventSource>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let (notices, _) = broadcast::channel(64);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                source,
                mirror: RwLock::new(OrderMirror::new()),
                notices,
            }),
            task: Mutex::new(None),
        })
    }

    /// Suscribe al canal y después lee la colección completa.
    ///
    /// En ese orden, ningún evento publicado tras la lectura se pierde.
    pub async fn start(&self) -> ClientResult<()> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let handler: EventHandler = Arc::new(move |signal| {
            let _ = tx.send(signal);
        });

        let subscription = self
            .inner
            .source
            .subscribe(&EventName::ALL, handler.clone())
            .await?;
        self.inner.refresh().await?;

        let inner = self.inner.clone();
        *task = Some(tokio::spawn(run_sync(inner, rx, handler, subscription)));
        info!("🔄 Cliente de sincronización iniciado ({:?})", self.inner.config.role);
        Ok(())
    }

    /// Detiene la tarea de sincronización y suelta la suscripción
    pub async fn shutdown(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
            debug!("🔄 Cliente de sincronización detenido");
        }
    }

    pub async fn orders(&self) -> Vec<ServiceOrder> {
        self.inner.mirror.read().await.snapshot()
    }

    pub async fn get(&self, id: Uuid) -> Option<ServiceOrder> {
        self.inner.mirror.read().await.get(id).cloned()
    }

    /// Relee la colección y reemplaza el espejo
    pub async fn refresh(&self) -> ClientResult<()> {
        self.inner.refresh().await
    }

    /// Avisos de órdenes nuevas. Solo el rol administrador los recibe.
    pub fn notices(&self) -> broadcast::Receiver<OrderNotice> {
        self.inner.notices.subscribe()
    }

    pub async fn create_order(&self, request: CreateServiceOrderRequest) -> ClientResult<ServiceOrder> {
        let order: ServiceOrder = self
            .inner
            .send(self.inner.request(Method::POST, "/services").json(&request))
            .await?;
        self.inner.apply_local(order.clone()).await;
        Ok(order)
    }

    pub async fn create_direct_order(
        &self,
        request: DirectServiceOrderRequest,
    ) -> ClientResult<ServiceOrder> {
        let order: ServiceOrder = self
            .inner
            .send(self.inner.request(Method::POST, "/services/direct").json(&request))
            .await?;
        self.inner.apply_local(order.clone()).await;
        Ok(order)
    }

    pub async fn approve_order(&self, id: Uuid, total_cost: Decimal) -> ClientResult<ServiceOrder> {
        // El backend acepta el monto como string numérico sin perder precisión
        let body = ApproveServiceOrderRequest {
            total_cost: Some(Value::String(total_cost.to_string())),
        };
        let order: ServiceOrder = self
            .inner
            .send(
                self.inner
                    .request(Method::PATCH, &format!("/services/{}/approve", id))
                    .json(&body),
            )
            .await?;
        self.inner.apply_local(order.clone()).await;
        Ok(order)
    }

    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateServiceOrderRequest,
    ) -> ClientResult<ServiceOrder> {
        let order: ServiceOrder = self
            .inner
            .send(
                self.inner
                    .request(Method::PUT, &format!("/services/{}", id))
                    .json(&request),
            )
            .await?;
        self.inner.apply_local(order.clone()).await;
        Ok(order)
    }

    /// Las bajas no viajan por el canal; solo el cliente que borra lo refleja
    pub async fn delete_order(&self, id: Uuid) -> ClientResult<()> {
        let response = self
            .inner
            .request(Method::DELETE, &format!("/services/{}", id))
            .send()
            .await?;
        check(response).await?;
        self.inner.mirror.write().await.remove(id);
        Ok(())
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}

impl Inner {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.config.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn refresh(&self) -> ClientResult<()> {
        let orders: Vec<ServiceOrder> = self.send(self.request(Method::GET, "/services")).await?;
        let count = orders.len();
        self.mirror.write().await.replace_all(orders);
        debug!("🔄 Espejo recargado con {} órdenes", count);
        Ok(())
    }

    async fn apply_local(&self, order: ServiceOrder) {
        let id = order.id;
        let outcome = self.mirror.write().await.apply_local(order);
        debug!("🔄 Respuesta local para orden {}: {:?}", id, outcome);
    }

    async fn apply_event(&self, event: OrderEvent) {
        let outcome = self.mirror.write().await.apply_event(&event);
        debug!("📨 Evento {} para orden {}: {:?}", event.name(), event.order().id, outcome);

        if let OrderEvent::OrderCreated { notice, .. } = event {
            if self.config.role == ClientRole::Admin && outcome != MergeOutcome::Ignored {
                // Sin receptores el aviso se pierde
                let _ = self.notices.send(notice);
            }
        }
    }

    /// Reintenta la suscripción hasta lograrla y recién entonces relee
    async fn reconnect(&self, handler: &EventHandler) -> Subscription {
        let mut attempt = 0u32;
        loop {
            let delay = self.config.backoff.delay(attempt);
            tokio::time::sleep(delay).await;

            match self.source.subscribe(&EventName::ALL, handler.clone()).await {
                Ok(subscription) => {
                    info!("🔌 Canal de eventos restablecido tras {} intentos", attempt + 1);
                    self.resync().await;
                    return subscription;
                }
                Err(e) => {
                    warn!("🔌 Reconexión fallida (intento {}): {}", attempt + 1, e);
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    /// Relee la colección hasta lograrlo. Es la única recuperación posible:
    /// no hay replay de eventos, así que el espejo no se da por bueno antes.
    /// Las señales que llegan mientras tanto quedan en cola.
    async fn resync(&self) {
        let mut attempt = 0u32;
        while let Err(e) = self.refresh().await {
            error!("❌ No se pudo releer la colección (intento {}): {}", attempt + 1, e);
            tokio::time::sleep(self.config.backoff.delay(attempt)).await;
            attempt = attempt.saturating_add(1);
        }
        if attempt > 0 {
            info!("🔄 Colección releída tras {} reintentos", attempt);
        }
    }
}

async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Única tarea que aplica las señales del canal, en orden de llegada
async fn run_sync(
    inner: Arc<Inner>,
    mut signals: mpsc::UnboundedReceiver<ChannelSignal>,
    handler: EventHandler,
    subscription: Subscription,
) {
    let mut subscription = Some(subscription);

    while let Some(signal) = signals.recv().await {
        match signal {
            ChannelSignal::Event(event) => inner.apply_event(event).await,
            ChannelSignal::Resync => inner.resync().await,
            ChannelSignal::Closed => {
                warn!("🔌 Canal de eventos cerrado, reconectando");
                subscription.take();
                subscription = Some(inner.reconnect(&handler).await);
            }
        }
    }
}
