use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use super::extract::ApiJson;
use super::parse_id;
use crate::dto::service_order_dto::{
    ApproveServiceOrderRequest, CreateServiceOrderRequest, DirectServiceOrderRequest,
    UpdateServiceOrderRequest,
};
use crate::models::ServiceOrder;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_service_order_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_service_orders).post(create_service_order))
        .route("/direct", post(create_direct_service_order))
        .route(
            "/:id",
            get(get_service_order)
                .put(update_service_order)
                .delete(delete_service_order),
        )
        .route("/:id/approve", patch(approve_service_order))
}

async fn list_service_orders(State(state): State<AppState>) -> AppResult<Json<Vec<ServiceOrder>>> {
    Ok(Json(state.service_orders.list().await?))
}

async fn get_service_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceOrder>> {
    let id = parse_id(&id)?;
    Ok(Json(state.service_orders.get(id).await?))
}

// Ruta que usa el mecánico: crea la orden y avisa a todos los clientes
async fn create_service_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateServiceOrderRequest>,
) -> AppResult<(StatusCode, Json<ServiceOrder>)> {
    let order = state.service_orders.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn create_direct_service_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DirectServiceOrderRequest>,
) -> AppResult<(StatusCode, Json<ServiceOrder>)> {
    let order = state.service_orders.create_direct(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// Ruta que usa el administrador: aprueba y fija el precio final
async fn approve_service_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ApproveServiceOrderRequest>,
) -> AppResult<Json<ServiceOrder>> {
    let id = parse_id(&id)?;
    Ok(Json(state.service_orders.approve(id, request).await?))
}

async fn update_service_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateServiceOrderRequest>,
) -> AppResult<Json<ServiceOrder>> {
    let id = parse_id(&id)?;
    Ok(Json(state.service_orders.update(id, request).await?))
}

async fn delete_service_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    state.service_orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
