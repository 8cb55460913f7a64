//! User management and profile routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    middleware::AuthUser,
    routes::{
        auth::{internal_error, user_json},
        complaints::{actor_of, lifecycle_error},
    },
};
use redress_core::{
    auth::hash_password,
    lifecycle::{Operation, Role, authorize},
};
use redress_db::{
    TenantRepository, UserRepository,
    entities::sea_orm_active_enums::{TenantStatus, UserRole},
    repositories::role_to_db,
};
use redress_shared::auth::{CreateStaffRequest, UpdateUserRequest, UserListQuery};

/// Creates the users router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_staff))
        .route("/users", get(list_users))
        .route("/users/me", get(get_profile))
        .route("/users/tenant/{tenant_id}", get(list_tenant_users))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}", patch(update_user))
        .route("/users/{user_id}", delete(delete_user))
}

/// POST /users - Create a staff account (admin only).
#[allow(clippy::too_many_lines)]
async fn create_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateStaffRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::CreateStaff) {
        return lifecycle_error(&e);
    }

    // Only the three staff roles can be created through this path
    let role = match Role::parse(&payload.role) {
        Some(r) if r.is_staff() => r,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_role",
                    "message": "Role must be one of: ha, sp, hm"
                })),
            )
                .into_response();
        }
    };

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

    let tenant_repo = TenantRepository::new((*state.db).clone());
    let user_repo = UserRepository::new((*state.db).clone());

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
                "message": "Cannot create staff for an inactive tenant"
            })),
        )
            .into_response();
    }

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

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let user = match user_repo
        .create(
            &payload.email,
            &password_hash,
            &payload.first_name,
            &payload.last_name,
            role_to_db(role),
            Some(tenant.id),
        )
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create staff account");
            return internal_error();
        }
    };

    info!(
        user_id = %user.id,
        tenant_id = %tenant.id,
        role = %role,
        created_by = %actor.user_id,
        "Staff account created"
    );

    (StatusCode::CREATED, Json(user_json(&user))).into_response()
}

/// GET /users - List user accounts (admin only).
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserListQuery>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::ListUsers) {
        return lifecycle_error(&e);
    }

    let role = match query.role.as_deref() {
        None => None,
        Some(s) => match Role::parse(s) {
            Some(r) => Some(role_to_db(r)),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_role",
                        "message": "Role must be one of: admin, consumer, ha, sp, hm"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = UserRepository::new((*state.db).clone());
    let users = match repo.list(role, query.tenant_id).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Database error listing users");
            return internal_error();
        }
    };

    let users: Vec<_> = users.iter().map(user_json).collect();

    (StatusCode::OK, Json(json!({ "users": users }))).into_response()
}

/// GET `/users/tenant/{tenant_id}` - List a tenant's user accounts.
///
/// Admins can list any tenant; agents and managers only their own.
async fn list_tenant_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::ListTenantUsers) {
        return lifecycle_error(&e);
    }

    if actor.role != Role::Admin && actor.tenant_id != Some(tenant_id) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "access_denied",
                "message": "You may only list users of your own tenant"
            })),
        )
            .into_response();
    }

    let repo = UserRepository::new((*state.db).clone());
    let users = match repo.list(None, Some(tenant_id)).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Database error listing tenant users");
            return internal_error();
        }
    };

    let users: Vec<_> = users.iter().map(user_json).collect();

    (StatusCode::OK, Json(json!({ "users": users }))).into_response()
}

/// GET /users/me - Get the caller's profile with tenant details.
async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::GetUser) {
        return lifecycle_error(&e);
    }

    let repo = UserRepository::new((*state.db).clone());

    match repo.find_with_tenant(auth.user_id()).await {
        Ok(Some((user, tenant))) => {
            let mut body = user_json(&user);
            if let (Some(obj), Some(tenant)) = (body.as_object_mut(), tenant) {
                obj.insert(
                    "tenant".to_string(),
                    json!({ "id": tenant.id, "name": tenant.name }),
                );
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching profile");
            internal_error()
        }
    }
}

/// PATCH `/users/{user_id}` - Update a user's profile fields.
///
/// Users edit their own profile; admins can edit anyone's.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::UpdateUser) {
        return lifecycle_error(&e);
    }

    if actor.role != Role::Admin && user_id != actor.user_id {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "access_denied",
                "message": "You may only edit your own profile"
            })),
        )
            .into_response();
    }

    if payload.first_name.is_none() && payload.last_name.is_none() && payload.email.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response();
    }

    let repo = UserRepository::new((*state.db).clone());

    // A changed email must stay unique
    if let Some(ref email) = payload.email {
        match repo.find_by_email(email).await {
            Ok(Some(existing)) if existing.id != user_id => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "email_exists",
                        "message": "An account with this email already exists"
                    })),
                )
                    .into_response();
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Database error checking email");
                return internal_error();
            }
        }
    }

    let user = match repo
        .update_profile(
            user_id,
            payload.first_name.clone(),
            payload.last_name.clone(),
            payload.email.clone(),
        )
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update user");
            return internal_error();
        }
    };

    info!(user_id = %user.id, updated_by = %actor.user_id, "User profile updated");

    (StatusCode::OK, Json(user_json(&user))).into_response()
}

/// DELETE `/users/{user_id}` - Delete a user account (admin only).
///
/// Admin accounts cannot be deleted.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::DeleteUser) {
        return lifecycle_error(&e);
    }

    let repo = UserRepository::new((*state.db).clone());
    let user = match repo.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching user");
            return internal_error();
        }
    };

    if user.role == UserRole::Admin {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "cannot_delete_admin",
                "message": "Admin accounts cannot be deleted"
            })),
        )
            .into_response();
    }

    match repo.delete(user_id).await {
        Ok(true) => {}
        Ok(false) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to delete user");
            return internal_error();
        }
    }

    info!(user_id = %user_id, deleted_by = %actor.user_id, "User deleted");

    StatusCode::NO_CONTENT.into_response()
}

/// GET `/users/{user_id}` - Get a user account.
///
/// Admins can fetch anyone; agents and managers anyone in their tenant;
/// everyone else only themselves.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::GetUser) {
        return lifecycle_error(&e);
    }

    let repo = UserRepository::new((*state.db).clone());
    let user = match repo.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching user");
            return internal_error();
        }
    };

    let allowed = match actor.role {
        Role::Admin => true,
        Role::HelpdeskAgent | Role::HelpdeskManager => user.tenant_id == actor.tenant_id,
        _ => user.id == actor.user_id,
    };
    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "access_denied",
                "message": "You cannot view this user"
            })),
        )
            .into_response();
    }

    (StatusCode::OK, Json(user_json(&user))).into_response()
}

fn user_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "User not found"
        })),
    )
        .into_response()
}
