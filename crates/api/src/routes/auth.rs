//! Authentication routes for consumer registration and login.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use redress_core::auth::{hash_password, verify_password};
use redress_db::{
    TenantRepository, UserRepository,
    entities::{
        sea_orm_active_enums::{TenantStatus, UserRole},
        users,
    },
};
use redress_shared::auth::{LoginRequest, RegisterConsumerRequest};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// POST /auth/register - Register a new consumer account.
#[allow(clippy::too_many_lines)]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterConsumerRequest>,
) -> Response {
    let user_repo = UserRepository::new((*state.db).clone());
    let tenant_repo = TenantRepository::new((*state.db).clone());

    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "weak_password",
                "message": "Password must be at least 8 characters"
            })),
        )
            .into_response();
    }

    // The target tenant must exist and be accepting signups
    let tenant = match tenant_repo.find_by_id(payload.tenant_id).await {
        Ok(Some(t)) => t,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_tenant",
                    "message": "Tenant does not exist"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error fetching tenant");
            return internal_error();
        }
    };

    if tenant.status != TenantStatus::Active {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "tenant_inactive",
                "message": "This tenant is not accepting registrations"
            })),
        )
            .into_response();
    }

    // Check if email already exists
    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error();
        }
    }

    // Hash password
    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    // Create consumer account
    let user = match user_repo
        .create(
            &payload.email,
            &password_hash,
            &payload.first_name,
            &payload.last_name,
            UserRole::Consumer,
            Some(tenant.id),
        )
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error();
        }
    };

    let token = match state
        .jwt_service
        .generate_token(user.id, "consumer", user.tenant_id)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, tenant_id = %tenant.id, "Consumer registered");

    (
        StatusCode::CREATED,
        Json(json!({
            "user": user_json(&user),
            "token": token,
            "expires_in": state.jwt_service.token_expires_in()
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate a user and return a token.
#[allow(clippy::too_many_lines)]
async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    let user_repo = UserRepository::new((*state.db).clone());
    let tenant_repo = TenantRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    // Users of a deactivated or deleted tenant cannot log in
    if let Some(tenant_id) = user.tenant_id {
        match tenant_repo.find_by_id(tenant_id).await {
            Ok(Some(t)) if t.status == TenantStatus::Active => {}
            Ok(_) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "tenant_inactive",
                        "message": "This account's tenant has been deactivated"
                    })),
                )
                    .into_response();
            }
            Err(e) => {
                error!(error = %e, "Database error fetching tenant");
                return internal_error();
            }
        }
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    // Generate token
    let role = role_str(&user.role);
    let token = match state
        .jwt_service
        .generate_token(user.id, role, user.tenant_id)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    (
        StatusCode::OK,
        Json(json!({
            "user": user_json(&user),
            "token": token,
            "expires_in": state.jwt_service.token_expires_in()
        })),
    )
        .into_response()
}

/// Builds the public JSON view of a user.
pub(crate) fn user_json(user: &users::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "role": role_str(&user.role),
        "tenant_id": user.tenant_id,
        "created_at": user.created_at
    })
}

/// Converts a database role to its wire string.
pub(crate) const fn role_str(role: &UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Consumer => "consumer",
        UserRole::HelpdeskAgent => "ha",
        UserRole::SupportPerson => "sp",
        UserRole::HelpdeskManager => "hm",
    }
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
