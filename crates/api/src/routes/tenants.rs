//! Tenant management routes.
//!
//! CRUD is admin only; the active-tenant listing is public so that
//! consumers can pick a tenant while registering.

use axum::{
    Json, Router,
    extract::{Path, State},
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
        auth::internal_error,
        complaints::{actor_of, lifecycle_error},
    },
};
use redress_core::lifecycle::{Operation, authorize};
use redress_db::{
    TenantRepository,
    entities::{
        sea_orm_active_enums::{TenantStatus, TenantType},
        tenants,
    },
};
use redress_shared::auth::{CreateTenantRequest, UpdateTenantRequest};

/// Creates the tenants router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants", post(create_tenant))
        .route("/tenants", get(list_tenants))
        .route("/tenants/{tenant_id}", get(get_tenant))
        .route("/tenants/{tenant_id}", patch(update_tenant))
        .route("/tenants/{tenant_id}", delete(delete_tenant))
}

/// Creates the unauthenticated tenants router.
///
/// Registration needs the tenant list before the consumer has an account.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/tenants/active", get(list_active_tenants))
}

/// GET /tenants/active - List active tenants, no authentication required.
async fn list_active_tenants(State(state): State<AppState>) -> Response {
    let repo = TenantRepository::new((*state.db).clone());
    let tenants = match repo.list_active().await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Database error listing active tenants");
            return internal_error();
        }
    };

    let tenants: Vec<_> = tenants.iter().map(tenant_json).collect();

    (StatusCode::OK, Json(json!({ "tenants": tenants }))).into_response()
}

/// POST /tenants - Create a new tenant.
async fn create_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTenantRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::CreateTenant) {
        return lifecycle_error(&e);
    }

    let Some(tenant_type) = TenantType::parse(&payload.tenant_type) else {
        return invalid_type();
    };

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Tenant name is required"
            })),
        )
            .into_response();
    }

    let repo = TenantRepository::new((*state.db).clone());

    match repo.name_exists(payload.name.trim()).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "name_exists",
                    "message": "A tenant with this name already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking tenant name");
            return internal_error();
        }
    }

    let tenant = match repo.create(payload.name.trim(), tenant_type).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to create tenant");
            return internal_error();
        }
    };

    info!(tenant_id = %tenant.id, name = %tenant.name, "Tenant created");

    (StatusCode::CREATED, Json(tenant_json(&tenant))).into_response()
}

/// GET /tenants - List all tenants.
async fn list_tenants(State(state): State<AppState>, auth: AuthUser) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::ListTenants) {
        return lifecycle_error(&e);
    }

    let repo = TenantRepository::new((*state.db).clone());
    let tenants = match repo.list().await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Database error listing tenants");
            return internal_error();
        }
    };

    let tenants: Vec<_> = tenants.iter().map(tenant_json).collect();

    (StatusCode::OK, Json(json!({ "tenants": tenants }))).into_response()
}

/// GET `/tenants/{tenant_id}` - Get tenant details.
async fn get_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::GetTenant) {
        return lifecycle_error(&e);
    }

    let repo = TenantRepository::new((*state.db).clone());
    match repo.find_by_id(tenant_id).await {
        Ok(Some(tenant)) => (StatusCode::OK, Json(tenant_json(&tenant))).into_response(),
        Ok(None) => tenant_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching tenant");
            internal_error()
        }
    }
}

/// PATCH `/tenants/{tenant_id}` - Update a tenant's name, type, or status.
async fn update_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateTenantRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::UpdateTenant) {
        return lifecycle_error(&e);
    }

    if payload.name.is_none() && payload.tenant_type.is_none() && payload.status.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response();
    }

    let tenant_type = match payload.tenant_type.as_deref() {
        None => None,
        Some(s) => match TenantType::parse(s) {
            Some(t) => Some(t),
            None => return invalid_type(),
        },
    };
    let status = match payload.status.as_deref() {
        None => None,
        Some(s) => match TenantStatus::parse(s) {
            Some(st) => Some(st),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: active, inactive"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = TenantRepository::new((*state.db).clone());
    let tenant = match repo
        .update(tenant_id, payload.name.clone(), tenant_type, status)
        .await
    {
        Ok(Some(t)) => t,
        Ok(None) => return tenant_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update tenant");
            return internal_error();
        }
    };

    info!(tenant_id = %tenant_id, "Tenant updated");

    (StatusCode::OK, Json(tenant_json(&tenant))).into_response()
}

/// DELETE `/tenants/{tenant_id}` - Deactivate a tenant.
///
/// Deletion is a status flip: the row stays visible to the admin and a
/// later update can re-activate it.
async fn delete_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };
    if let Err(e) = authorize(&actor, Operation::DeleteTenant) {
        return lifecycle_error(&e);
    }

    let repo = TenantRepository::new((*state.db).clone());
    match repo.deactivate(tenant_id).await {
        Ok(true) => {}
        Ok(false) => return tenant_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to deactivate tenant");
            return internal_error();
        }
    }

    info!(tenant_id = %tenant_id, deactivated_by = %actor.user_id, "Tenant deactivated");

    StatusCode::NO_CONTENT.into_response()
}

/// Builds the JSON view of a tenant.
fn tenant_json(tenant: &tenants::Model) -> serde_json::Value {
    json!({
        "id": tenant.id,
        "name": tenant.name,
        "type": type_str(&tenant.tenant_type),
        "status": match tenant.status {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
        },
        "created_at": tenant.created_at,
        "updated_at": tenant.updated_at
    })
}

pub(crate) const fn type_str(tenant_type: &TenantType) -> &'static str {
    match tenant_type {
        TenantType::Bank => "bank",
        TenantType::Telecom => "telecom",
        TenantType::Airline => "airline",
    }
}

fn invalid_type() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_type",
            "message": "Type must be one of: bank, telecom, airline"
        })),
    )
        .into_response()
}

fn tenant_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Tenant not found"
        })),
    )
        .into_response()
}
