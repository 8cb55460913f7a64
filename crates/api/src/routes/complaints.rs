//! Complaint lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    middleware::AuthUser,
    routes::{
        auth::{internal_error, role_str},
        tenants::type_str,
    },
};
use redress_core::lifecycle::{Actor, ComplaintStatus, LifecycleError, Priority};
use redress_db::{
    ComplaintRepository,
    entities::{
        complaint_updates, complaints,
        sea_orm_active_enums::{ComplaintPriority as DbPriority, ComplaintStatus as DbStatus},
        tenants, users,
    },
    repositories::ComplaintDetail,
};
use redress_shared::auth::{
    AddNoteRequest, AssignComplaintRequest, ComplaintListQuery, ConfirmResolutionRequest,
    CreateComplaintRequest, UpdateStatusRequest,
};

/// Creates the complaints router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/complaints", post(create_complaint))
        .route("/complaints", get(list_complaints))
        .route(
            "/complaints/consumer/{consumer_id}",
            get(list_consumer_complaints),
        )
        .route(
            "/complaints/tenant/{tenant_id}",
            get(list_tenant_complaints),
        )
        .route("/complaints/{complaint_id}", get(get_complaint))
        .route("/complaints/{complaint_id}/assign", post(assign_complaint))
        .route("/complaints/{complaint_id}/status", patch(update_status))
        .route("/complaints/{complaint_id}/notes", post(add_note))
        .route(
            "/complaints/{complaint_id}/confirm",
            post(confirm_resolution),
        )
}

/// POST /complaints - File a new complaint.
async fn create_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateComplaintRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let priority = match payload.priority.as_deref() {
        None => Priority::default(),
        Some(s) => match Priority::parse(s) {
            Some(p) => p,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_priority",
                        "message": "Priority must be one of: low, medium, high"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaint = match repo
        .create(
            &actor,
            &payload.title,
            &payload.description,
            payload.category.clone(),
            priority,
        )
        .await
    {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    info!(
        complaint_id = %complaint.id,
        tenant_id = %complaint.tenant_id,
        consumer_id = %actor.user_id,
        "Complaint filed"
    );

    (StatusCode::CREATED, Json(complaint_json(&complaint))).into_response()
}

/// GET /complaints - List complaints visible to the caller.
async fn list_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ComplaintListQuery>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match ComplaintStatus::parse(s) {
            Some(status) => Some(status),
            None => return invalid_status(),
        },
    };
    let priority = match query.priority.as_deref() {
        None => None,
        Some(s) => match Priority::parse(s) {
            Some(p) => Some(p),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_priority",
                        "message": "Priority must be one of: low, medium, high"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaints = match repo.list(&actor, status, priority).await {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    let complaints: Vec<_> = complaints.iter().map(complaint_json).collect();

    (StatusCode::OK, Json(json!({ "complaints": complaints }))).into_response()
}

/// GET `/complaints/consumer/{consumer_id}` - List a consumer's own complaints.
async fn list_consumer_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(consumer_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaints = match repo.list_by_consumer(&actor, consumer_id).await {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    let complaints: Vec<_> = complaints.iter().map(complaint_json).collect();

    (StatusCode::OK, Json(json!({ "complaints": complaints }))).into_response()
}

/// GET `/complaints/tenant/{tenant_id}` - List every complaint of a tenant.
async fn list_tenant_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaints = match repo.list_by_tenant(&actor, tenant_id).await {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    let complaints: Vec<_> = complaints.iter().map(complaint_json).collect();

    (StatusCode::OK, Json(json!({ "complaints": complaints }))).into_response()
}

/// GET `/complaints/{complaint_id}` - Get a complaint with its related
/// records and audit trail.
async fn get_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<uuid::Uuid>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let detail = match repo.find_visible(&actor, complaint_id).await {
        Ok(d) => d,
        Err(e) => return lifecycle_error(&e),
    };

    (StatusCode::OK, Json(detail_json(&detail))).into_response()
}

/// POST `/complaints/{complaint_id}/assign` - Assign a complaint to a support person.
async fn assign_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<uuid::Uuid>,
    Json(payload): Json<AssignComplaintRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaint = match repo.assign(&actor, complaint_id, payload.assigned_to).await {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    info!(
        complaint_id = %complaint_id,
        assigned_to = %payload.assigned_to,
        assigned_by = %actor.user_id,
        "Complaint assigned"
    );

    (StatusCode::OK, Json(complaint_json(&complaint))).into_response()
}

/// PATCH `/complaints/{complaint_id}/status` - Change a complaint's status.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let Some(new_status) = ComplaintStatus::parse(&payload.status) else {
        return invalid_status();
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaint = match repo
        .update_status(&actor, complaint_id, new_status, payload.note.as_deref())
        .await
    {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    info!(
        complaint_id = %complaint_id,
        status = %new_status,
        updated_by = %actor.user_id,
        "Complaint status updated"
    );

    (StatusCode::OK, Json(complaint_json(&complaint))).into_response()
}

/// POST `/complaints/{complaint_id}/notes` - Add a progress note.
async fn add_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<uuid::Uuid>,
    Json(payload): Json<AddNoteRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let entry = match repo.add_note(&actor, complaint_id, &payload.note).await {
        Ok(u) => u,
        Err(e) => return lifecycle_error(&e),
    };

    (StatusCode::CREATED, Json(update_json(&entry))).into_response()
}

/// POST `/complaints/{complaint_id}/confirm` - Consumer confirms a resolution.
async fn confirm_resolution(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(complaint_id): Path<uuid::Uuid>,
    Json(payload): Json<ConfirmResolutionRequest>,
) -> Response {
    let actor = match actor_of(&auth) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let repo = ComplaintRepository::new((*state.db).clone(), state.engine);
    let complaint = match repo
        .confirm_resolution(&actor, complaint_id, payload.feedback.as_deref())
        .await
    {
        Ok(c) => c,
        Err(e) => return lifecycle_error(&e),
    };

    info!(
        complaint_id = %complaint_id,
        consumer_id = %actor.user_id,
        "Resolution confirmed, complaint closed"
    );

    (StatusCode::OK, Json(complaint_json(&complaint))).into_response()
}

/// Builds the lifecycle actor for the request, rejecting unknown roles.
pub(crate) fn actor_of(auth: &AuthUser) -> Result<Actor, Response> {
    auth.actor().ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_token",
                "message": "Token carries an unknown role"
            })),
        )
            .into_response()
    })
}

/// Translates a lifecycle error into an HTTP response.
pub(crate) fn lifecycle_error(err: &LifecycleError) -> Response {
    if let LifecycleError::Database(e) = err {
        error!(error = %e, "Database error");
        return internal_error();
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

fn invalid_status() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_status",
            "message": "Status must be one of: logged, assigned, in_progress, resolved, closed"
        })),
    )
        .into_response()
}

/// Builds the JSON view of a complaint.
fn complaint_json(complaint: &complaints::Model) -> serde_json::Value {
    json!({
        "id": complaint.id,
        "tenant_id": complaint.tenant_id,
        "consumer_id": complaint.consumer_id,
        "assigned_to": complaint.assigned_to,
        "title": complaint.title,
        "description": complaint.description,
        "category": complaint.category,
        "priority": priority_str(&complaint.priority),
        "status": status_str(&complaint.status),
        "resolved_at": complaint.resolved_at,
        "closed_at": complaint.closed_at,
        "created_at": complaint.created_at,
        "updated_at": complaint.updated_at
    })
}

/// Builds the JSON view of a complaint with its related records.
fn detail_json(detail: &ComplaintDetail) -> serde_json::Value {
    let updates: Vec<_> = detail
        .updates
        .iter()
        .map(|(update, author)| {
            let mut value = update_json(update);
            value["author"] = author.as_ref().map_or(serde_json::Value::Null, user_summary);
            value
        })
        .collect();

    json!({
        "complaint": complaint_json(&detail.complaint),
        "consumer": detail.consumer.as_ref().map(user_summary),
        "assignee": detail.assignee.as_ref().map(user_summary),
        "tenant": detail.tenant.as_ref().map(tenant_summary),
        "updates": updates
    })
}

/// Builds the JSON view of an audit entry.
fn update_json(update: &complaint_updates::Model) -> serde_json::Value {
    json!({
        "id": update.id,
        "complaint_id": update.complaint_id,
        "status_changed_to": update.status_changed_to.as_ref().map(status_str),
        "note": update.note,
        "is_resolution": update.is_resolution,
        "consumer_confirmed": update.consumer_confirmed,
        "consumer_feedback": update.consumer_feedback,
        "updated_by": update.updated_by,
        "created_at": update.created_at
    })
}

/// Short user view embedded in complaint details, password hash excluded.
fn user_summary(user: &users::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "role": role_str(&user.role)
    })
}

/// Short tenant view embedded in complaint details.
fn tenant_summary(tenant: &tenants::Model) -> serde_json::Value {
    json!({
        "id": tenant.id,
        "name": tenant.name,
        "type": type_str(&tenant.tenant_type)
    })
}

const fn status_str(status: &DbStatus) -> &'static str {
    match status {
        DbStatus::Logged => "logged",
        DbStatus::Assigned => "assigned",
        DbStatus::InProgress => "in_progress",
        DbStatus::Resolved => "resolved",
        DbStatus::Closed => "closed",
    }
}

const fn priority_str(priority: &DbPriority) -> &'static str {
    match priority {
        DbPriority::Low => "low",
        DbPriority::Medium => "medium",
        DbPriority::High => "high",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redress_db::entities::sea_orm_active_enums::{TenantStatus, TenantType, UserRole};
    use sea_orm::prelude::DateTimeWithTimeZone;
    use uuid::Uuid;

    fn now() -> DateTimeWithTimeZone {
        chrono::Utc::now().into()
    }

    fn sample_user(email: &str, role: UserRole, tenant_id: Option<Uuid>) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            tenant_id,
            email: email.to_string(),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            role,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_detail_json_nests_related_records() {
        let tenant = tenants::Model {
            id: Uuid::new_v4(),
            name: "Acme Bank".to_string(),
            tenant_type: TenantType::Bank,
            status: TenantStatus::Active,
            created_at: now(),
            updated_at: now(),
        };
        let consumer = sample_user("maria@example.com", UserRole::Consumer, Some(tenant.id));
        let author = sample_user("agent@example.com", UserRole::HelpdeskAgent, Some(tenant.id));

        let complaint = complaints::Model {
            id: Uuid::new_v4(),
            tenant_id: tenant.id,
            consumer_id: consumer.id,
            assigned_to: None,
            title: "Card reader broken".to_string(),
            description: "The reader rejects my card".to_string(),
            category: None,
            priority: DbPriority::Medium,
            status: DbStatus::Logged,
            resolved_at: None,
            closed_at: None,
            created_at: now(),
            updated_at: now(),
        };
        let update = complaint_updates::Model {
            id: Uuid::new_v4(),
            complaint_id: complaint.id,
            status_changed_to: None,
            note: "Waiting on parts".to_string(),
            is_resolution: false,
            consumer_confirmed: None,
            consumer_feedback: None,
            updated_by: author.id,
            created_at: now(),
        };

        let detail = ComplaintDetail {
            complaint,
            consumer: Some(consumer),
            assignee: None,
            tenant: Some(tenant),
            updates: vec![(update, Some(author))],
        };

        let body = detail_json(&detail);

        assert_eq!(body["consumer"]["email"], "maria@example.com");
        assert_eq!(body["consumer"]["role"], "consumer");
        assert!(body["consumer"].get("password_hash").is_none());
        assert!(body["assignee"].is_null());
        assert_eq!(body["tenant"]["name"], "Acme Bank");
        assert_eq!(body["tenant"]["type"], "bank");
        assert_eq!(body["updates"][0]["author"]["email"], "agent@example.com");
        // A plain note carries no transition and no confirmation yet.
        assert!(body["updates"][0]["status_changed_to"].is_null());
        assert!(body["updates"][0]["consumer_confirmed"].is_null());
    }
}
