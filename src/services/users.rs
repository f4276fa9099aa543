use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::auth::{LoginRequest, SignUpRequest, UserResponse};
use crate::services::database::Database;
use crate::services::password;

/// Validate, check for duplicates (case-insensitive), hash and store a new user.
pub async fn sign_up(database: &Database, request: SignUpRequest) -> Result<UserResponse, AppError> {
    let request = request.validate()?;
    let pool = database.require_pool()?;

    if username_taken(pool, &request.username).await? {
        return Err(AppError::Conflict(
            "Username is already taken. Please choose a different one.".to_string(),
        ));
    }
    if email_taken(pool, &request.email).await? {
        return Err(AppError::Conflict(
            "User with this email already exists. Please log in.".to_string(),
        ));
    }

    let plain = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))??;

    let id = Uuid::new_v4().simple().to_string();
    create_user(pool, &id, &request.username, &request.email, &password_hash).await?;
    log::info!("user {} signed up", request.username);

    Ok(UserResponse {
        id,
        username: request.username,
        email: request.email,
    })
}

/// Check a username/password pair. Unknown users and wrong passwords look the same.
pub async fn log_in(database: &Database, request: LoginRequest) -> Result<UserResponse, AppError> {
    let request = request.validate()?;
    let pool = database.require_pool()?;

    let row: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT id, username, email, password_hash FROM users WHERE LOWER(username) = LOWER($1)",
    )
    .bind(&request.username)
    .fetch_optional(pool)
    .await?;

    let Some((id, username, email, stored)) = row else {
        return Err(AppError::InvalidCredentials);
    };

    let plain = request.password;
    let matches = tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))??;

    if !matches {
        return Err(AppError::InvalidCredentials);
    }

    Ok(UserResponse { id, username, email })
}

async fn username_taken(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

async fn create_user(
    pool: &PgPool,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO users (id, username, display_name, email, password_hash) VALUES ($1, $2, $2, $3, $4)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::Conflict("Username or email is already registered.".to_string());
            }
        }
        AppError::from(e)
    })?;

    Ok(())
}
