use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::period::Period;

/// Failures raised by a record store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum PayrollError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payroll for {period} already generated for: {}", .employee_ids.join(", "))]
    ConflictAlreadyGenerated {
        period: Period,
        employee_ids: Vec<String>,
    },

    #[error("payroll {0} is already paid")]
    AlreadyPaid(u64),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::NotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PayrollError::ConflictAlreadyGenerated { .. } | PayrollError::AlreadyPaid(_) => {
                StatusCode::CONFLICT
            }
            PayrollError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PayrollError::Forbidden(_) => StatusCode::FORBIDDEN,
            PayrollError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            PayrollError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            PayrollError::Store(StoreError::Duplicate(what)) => {
                json!({ "error": format!("{what} already exists") })
            }
            PayrollError::Store(e) => {
                tracing::error!(error = %e, "Record store failure");
                json!({ "error": "Internal Server Error" })
            }
            PayrollError::ConflictAlreadyGenerated {
                period,
                employee_ids,
            } => json!({
                "error": self.to_string(),
                "period": period,
                "employee_ids": employee_ids,
            }),
            _ => {
                tracing::info!(status = %status, error = %self, "Request rejected");
                json!({ "error": self.to_string() })
            }
        };

        HttpResponse::build(status).json(body)
    }
}
