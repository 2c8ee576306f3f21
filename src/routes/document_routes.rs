use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use super::extract::ApiJson;
use super::parse_id;
use crate::controllers::document_controller::DocumentController;
use crate::dto::document_dto::CreateDocumentRequest;
use crate::models::WorkshopDocument;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_document_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/:id", delete(delete_document))
}

fn controller(state: &AppState) -> DocumentController {
    DocumentController::new(state.stores.documents.clone())
}

async fn list_documents(State(state): State<AppState>) -> AppResult<Json<Vec<WorkshopDocument>>> {
    Ok(Json(controller(&state).list().await?))
}

async fn create_document(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<WorkshopDocument>)> {
    let document = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    controller(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
