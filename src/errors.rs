use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::api_response::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("error loading .env file: {0}")]
    EnvironmentLoad(#[from] dotenv::Error),

    #[error("error parsing database config: {0}")]
    ConfigParse(String),

    #[error("error creating connection pool: {0}")]
    PoolCreation(String),

    #[error("error connecting to the database: {0}")]
    Connectivity(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Query(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Connectivity(err.to_string())
            }
            _ => AppError::Query(err.to_string()),
        }
    }
}

// Error body carried inside the ApiResponse envelope
#[derive(Debug, Serialize)]
pub struct ApiError {
    code: u16,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let api_error = ApiError {
            code: status.as_u16(),
            message: self.to_string(),
        };

        HttpResponse::build(status).json(ApiResponse {
            status: "FAILURE".to_string(),
            code: api_error.code,
            result: None::<()>,
            error: Some(api_error),
        })
    }
}
