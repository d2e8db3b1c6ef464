use serde::Serialize;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(String),
    Forbidden { reason: String, role: String },
    NotFound(String),
    ValidationError(String),
    InvalidTransition { from: String, to: String },
    DuplicateBooking(String),
    DatabaseError(mongodb::error::Error),
    StripeError(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden { reason, .. } => write!(f, "Forbidden: {}", reason),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InvalidTransition { from, to } => {
                write!(f, "Illegal booking status transition: {} to {}", from, to)
            }
            ApiError::DuplicateBooking(msg) => write!(f, "Duplicate booking: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database error: {}", e),
            ApiError::StripeError(msg) => write!(f, "Stripe error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Unauthenticated(_) => {
                HttpResponse::Unauthorized().json(ErrorResponse {
                    code: "UNAUTHENTICATED".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            ApiError::Forbidden { role, .. } => {
                HttpResponse::Forbidden().json(ErrorResponse {
                    code: "FORBIDDEN".to_string(),
                    message: self.to_string(),
                    details: Some(format!("actual role: {}", role)),
                })
            }
            ApiError::NotFound(_) => {
                HttpResponse::NotFound().json(ErrorResponse {
                    code: "NOT_FOUND".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            ApiError::ValidationError(_) => {
                HttpResponse::BadRequest().json(ErrorResponse {
                    code: "VALIDATION_ERROR".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            ApiError::InvalidTransition { .. } => {
                HttpResponse::Conflict().json(ErrorResponse {
                    code: "INVALID_TRANSITION".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            ApiError::DuplicateBooking(_) => {
                HttpResponse::Conflict().json(ErrorResponse {
                    code: "DUPLICATE_BOOKING".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            // Upstream failures are logged with their cause but answered with
            // a generic message; internals never reach the client.
            ApiError::DatabaseError(e) => {
                log::error!("Database error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    code: "DATABASE_ERROR".to_string(),
                    message: "Internal server error".to_string(),
                    details: None,
                })
            }
            ApiError::StripeError(msg) => {
                log::error!("Payment provider error: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    code: "STRIPE_ERROR".to_string(),
                    message: "Payment provider error".to_string(),
                    details: None,
                })
            }
            ApiError::InternalError(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Internal server error".to_string(),
                    details: None,
                })
            }
        }
    }
}
