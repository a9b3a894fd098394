use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use kokoromi_monitor::MonitorError;
use kokoromi_monitor::config::ConfigError;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0:#}")]
    Startup(#[from] anyhow::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Monitor(MonitorError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Monitor(MonitorError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Monitor(MonitorError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ApiResponse::<()>::failure(message))
    }
}
