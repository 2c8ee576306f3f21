//! Sistema de manejo de errores
//!
//! Este módulo define los errores del Record Store, del ciclo de vida de las
//! órdenes de servicio y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::service_order::ServiceStatus;

/// Fallos de persistencia. Nunca dejan escrituras parciales.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Errores del ciclo de vida de las órdenes de servicio
#[derive(Error, Debug)]
pub enum ServiceOrderError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Service order '{0}' not found")]
    NotFound(Uuid),

    #[error("Cannot move service order from {from} to {to}")]
    InvalidTransition { from: ServiceStatus, to: ServiceStatus },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceOrder(#[from] ServiceOrderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: code.to_string(),
        }
    }
}

fn storage_failure(e: &StorageError) -> (StatusCode, ErrorResponse) {
    error!("❌ Error de persistencia: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(
            "Storage Error",
            "An error occurred while accessing the record store".to_string(),
            "STORAGE_ERROR",
        ),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Storage(StorageError::Conflict(msg)) => {
                warn!("⚠️ Conflicto: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Conflict", msg, "CONFLICT"),
                )
            }

            AppError::ServiceOrder(ServiceOrderError::Storage(e)) | AppError::Storage(e) => {
                storage_failure(&e)
            }

            AppError::ServiceOrder(e) => {
                warn!("⚠️ Operación de orden rechazada: {}", e);
                let code = match &e {
                    ServiceOrderError::InvalidOrder(_) => "INVALID_ORDER",
                    ServiceOrderError::InvalidAmount(_) => "INVALID_AMOUNT",
                    ServiceOrderError::NotFound(_) => "NOT_FOUND",
                    ServiceOrderError::InvalidTransition { .. } => "INVALID_TRANSITION",
                    ServiceOrderError::Storage(_) => "STORAGE_ERROR",
                };
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(&e.to_string(), e.to_string(), code),
                )
            }

            AppError::Validation(e) => {
                warn!("⚠️ Error de validación: {}", e);
                let mut response = ErrorResponse::new(
                    "Validation Error",
                    "The provided data is invalid".to_string(),
                    "VALIDATION_ERROR",
                );
                response.details = Some(json!(e));
                (StatusCode::BAD_REQUEST, response)
            }

            AppError::NotFound(msg) => {
                warn!("⚠️ Recurso no encontrado: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", msg, "NOT_FOUND"),
                )
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(&msg, msg.clone(), "BAD_REQUEST"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
