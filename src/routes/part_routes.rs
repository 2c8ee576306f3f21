use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::extract::ApiJson;
use super::parse_id;
use crate::controllers::part_controller::PartController;
use crate::dto::part_dto::{CreatePartRequest, UpdatePartRequest};
use crate::models::Part;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_part_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route("/:id", get(get_part).put(update_part).delete(delete_part))
}

fn controller(state: &AppState) -> PartController {
    PartController::new(state.stores.parts.clone())
}

async fn create_part(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePartRequest>,
) -> AppResult<(StatusCode, Json<Part>)> {
    let part = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

async fn get_part(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Part>> {
    let id = parse_id(&id)?;
    Ok(Json(controller(&state).get_by_id(id).await?))
}

async fn list_parts(State(state): State<AppState>) -> AppResult<Json<Vec<Part>>> {
    Ok(Json(controller(&state).list().await?))
}

async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePartRequest>,
) -> AppResult<Json<Part>> {
    let id = parse_id(&id)?;
    Ok(Json(controller(&state).update(id, request).await?))
}

async fn delete_part(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    controller(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
