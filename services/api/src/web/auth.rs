//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use udaan_core::domain::{Identity, NewUser, Role};
use udaan_core::ports::PortError;

use crate::web::error::HttpError;
use crate::web::state::AppState;
use crate::web::students::{MessageResponse, UserResponse};
use crate::web::token;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "student", "recruiter", or "admin".
    pub role: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Validate the request at the boundary
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(HttpError::validation("name and email are required"));
    }
    if !req.email.contains('@') {
        return Err(HttpError::validation("email address is malformed"));
    }
    if req.password.len() < 6 {
        return Err(HttpError::validation(
            "password must be at least 6 characters",
        ));
    }
    let role = Role::parse(&req.role)
        .ok_or_else(|| HttpError::validation(format!("unknown role '{}'", req.role)))?;

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HttpError::internal("Failed to hash password")
        })?
        .to_string();

    // 3. Create user in database
    state
        .users
        .insert(NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HttpError::validation("User already exists"),
            other => HttpError::from(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// POST /auth/login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Get credentials by email. An unknown email and a wrong password
    //    are indistinguishable in the response.
    let credentials = state
        .users
        .find_credentials(&req.email)
        .await
        .map_err(|_| HttpError::unauthorized("Invalid email or password"))?;

    // 2. Verify the password
    let parsed_hash = PasswordHash::new(&credentials.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::internal("Authentication error")
    })?;
    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(HttpError::unauthorized("Invalid email or password"));
    }

    // 3. Issue the bearer token
    let identity = Identity {
        user_id: credentials.id,
        role: credentials.role,
    };
    let token = token::issue(
        &identity,
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )
    .map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        HttpError::internal("Failed to sign token")
    })?;

    // 4. Return the token with the password-free user record
    let user = state.users.get(credentials.id).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from_domain(user),
    }))
}
