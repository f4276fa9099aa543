use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;

use crate::errors::AppError;
use crate::models::api_response::{created_response, success_response};
use crate::models::auth::{LoginRequest, SignUpRequest};
use crate::models::health::HealthStatus;
use crate::services::{database::Database, users};

#[get("/health")]
async fn health(database: web::Data<Database>) -> Result<HttpResponse, AppError> {
    database.ping().await?;

    Ok(success_response(HealthStatus {
        database: "reachable".to_string(),
        checked_at: Utc::now(),
    }))
}

#[post("/signup")]
async fn signup(
    database: web::Data<Database>,
    request: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    let user = users::sign_up(&database, request.into_inner()).await?;
    Ok(created_response(user))
}

#[post("/login")]
async fn login(
    database: web::Data<Database>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = users::log_in(&database, request.into_inner()).await?;
    Ok(success_response(user))
}
