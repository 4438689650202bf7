//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Malformed request body: {message}")]
    MalformedBody { status: StatusCode, message: String },

    #[error("Degenerate range: end date {end} must be after start date {start}")]
    DegenerateRange { start: NaiveDate, end: NaiveDate },

    #[error("Rental of {days} days exceeds the maximum of {max}")]
    RangeTooLong { days: i64, max: u32 },

    #[error("Capacity overlap on {} date(s)", .dates.len())]
    CapacityOverlap { dates: Vec<NaiveDate> },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    /// Código estable que el cliente puede usar para decidir cómo reaccionar
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) | AppError::MalformedBody { .. } => "VALIDATION_ERROR",
            AppError::DegenerateRange { .. } => "DEGENERATE_RANGE",
            AppError::RangeTooLong { .. } => "RANGE_TOO_LONG",
            AppError::CapacityOverlap { .. } => "CAPACITY_OVERLAP",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_response) = match self {
            // Los errores de infraestructura se registran completos pero
            // al cliente solo le llega un mensaje genérico
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "An error occurred while accessing the database".to_string(),
                        code,
                    ),
                )
            }

            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Validation Error", "The provided data is invalid".to_string(), code)
                        .with_details(json!(e)),
                )
            }

            AppError::MalformedBody { status, message: msg } => {
                tracing::debug!("Malformed body: {}", msg);
                (
                    status,
                    ErrorResponse::new("Validation Error", "The request body could not be read".to_string(), code)
                        .with_details(json!({ "body": msg })),
                )
            }

            AppError::DegenerateRange { start, end } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "Degenerate Range",
                    "The end date must be at least one day after the start date".to_string(),
                    code,
                )
                .with_details(json!({
                    "start_date": start.to_string(),
                    "end_date": end.to_string(),
                })),
            ),

            AppError::RangeTooLong { days, max } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "Range Too Long",
                    format!("Rentals are limited to {} days, the selected period has {}", max, days),
                    code,
                )
                .with_details(json!({ "rental_days": days, "max_rental_days": max })),
            ),

            AppError::CapacityOverlap { dates } => {
                let blocked: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "Capacity Overlap",
                        format!(
                            "Sorry, the selected period includes fully booked dates ({}). Please choose different dates.",
                            blocked.join(", ")
                        ),
                        code,
                    )
                    .with_details(json!({ "blocked_dates": blocked })),
                )
            }

            AppError::Unauthorized(msg) => {
                tracing::debug!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("Unauthorized", msg, code))
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("⛔ Forbidden access: {}", msg);
                (StatusCode::FORBIDDEN, ErrorResponse::new("Forbidden", msg, code))
            }

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("Not Found", msg, code)),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new("Conflict", msg, code)),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new("Bad Request", msg, code)),

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal Server Error", "An unexpected error occurred".to_string(), code),
                )
            }

            AppError::Jwt(msg) => {
                tracing::debug!("JWT error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("JWT Error", "Token is not valid".to_string(), code),
                )
            }

            AppError::Hash(msg) => {
                tracing::error!("❌ Hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Hash Error",
                        "An error occurred while processing credentials".to_string(),
                        code,
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}
