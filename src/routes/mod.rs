//! Rutas HTTP
//!
//! La API y el canal de eventos se sirven desde la misma dirección.

pub mod document_routes;
pub mod extract;
pub mod event_routes;
pub mod part_routes;
pub mod service_order_routes;
pub mod vehicle_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::middleware::cors_layer;
use crate::models::DashboardStats;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError, AppResult};

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/dashboard-stats", get(dashboard_stats))
        .nest("/services", service_order_routes::create_service_order_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/parts", part_routes::create_part_router())
        .nest("/documents", document_routes::create_document_router())
        .merge(event_routes::create_event_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Ids de ruta inválidos son 400, no 404
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| bad_request_error(&format!("'{}' is not a valid id", raw)))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": &state.config.environment,
        "subscribers": state.hub.subscriber_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.service_orders.dashboard().await?))
}
