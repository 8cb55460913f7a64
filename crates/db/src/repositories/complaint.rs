//! Complaint repository for lifecycle state transitions.
//!
//! Every method fetches the current complaint snapshot, asks the lifecycle
//! engine for a validated action, and applies the complaint mutation and
//! its audit entry in a single transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use redress_core::lifecycle::{
    Actor, Assignee, AuditEntry, ComplaintState, ComplaintStatus, LifecycleEngine, LifecycleError,
    Operation, Priority, Role, VisibilityScope, authorize,
};

use crate::entities::{
    complaint_updates, complaints,
    sea_orm_active_enums::{
        ComplaintPriority as DbPriority, ComplaintStatus as DbStatus, UserRole,
    },
    tenants, users,
};

/// A complaint with its related records and audit trail.
#[derive(Debug, Clone)]
pub struct ComplaintDetail {
    /// The complaint.
    pub complaint: complaints::Model,
    /// The filing consumer.
    pub consumer: Option<users::Model>,
    /// The assigned support person, if any.
    pub assignee: Option<users::Model>,
    /// The owning tenant.
    pub tenant: Option<tenants::Model>,
    /// Audit entries in chronological order, each paired with its author.
    pub updates: Vec<(complaint_updates::Model, Option<users::Model>)>,
}

/// Complaint repository for lifecycle state transitions.
#[derive(Debug, Clone)]
pub struct ComplaintRepository {
    db: DatabaseConnection,
    engine: LifecycleEngine,
}

impl ComplaintRepository {
    /// Creates a new complaint repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engine: LifecycleEngine) -> Self {
        Self { db, engine }
    }

    /// Files a new complaint for the acting consumer.
    ///
    /// Inserts the complaint in `logged` status together with its initial
    /// audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not file complaints, the payload
    /// is invalid, or the database operation fails.
    pub async fn create(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
        category: Option<String>,
        priority: Priority,
    ) -> Result<complaints::Model, LifecycleError> {
        let action = self.engine.create(actor, title, description)?;

        let tenant_id = actor
            .tenant_id
            .ok_or_else(|| LifecycleError::AccessDenied("account has no tenant".to_string()))?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let now = Utc::now().into();
        let complaint = complaints::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            consumer_id: Set(actor.user_id),
            assigned_to: Set(None),
            title: Set(title.trim().to_string()),
            description: Set(description.trim().to_string()),
            category: Set(category),
            priority: Set(priority_to_db(priority)),
            status: Set(status_to_db(action.status)),
            resolved_at: Set(None),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let complaint = complaint.insert(&txn).await.map_err(db_err)?;
        insert_audit(&txn, complaint.id, &action.audit).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(complaint)
    }

    /// Lists complaints visible to the actor, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<ComplaintStatus>,
        priority: Option<Priority>,
    ) -> Result<Vec<complaints::Model>, LifecycleError> {
        let scope = VisibilityScope::for_actor(actor)?;

        let mut query = complaints::Entity::find();
        query = match scope {
            VisibilityScope::All => query,
            VisibilityScope::Tenant(tenant_id) => {
                query.filter(complaints::Column::TenantId.eq(tenant_id))
            }
            VisibilityScope::AssignedTo { tenant_id, user_id } => query
                .filter(complaints::Column::TenantId.eq(tenant_id))
                .filter(complaints::Column::AssignedTo.eq(user_id)),
            VisibilityScope::OwnedBy { tenant_id, user_id } => query
                .filter(complaints::Column::TenantId.eq(tenant_id))
                .filter(complaints::Column::ConsumerId.eq(user_id)),
        };

        if let Some(status) = status {
            query = query.filter(complaints::Column::Status.eq(status_to_db(status)));
        }
        if let Some(priority) = priority {
            query = query.filter(complaints::Column::Priority.eq(priority_to_db(priority)));
        }

        query
            .order_by_desc(complaints::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Fetches a complaint with its related records, enforcing visibility.
    ///
    /// A complaint outside the actor's scope is rejected as access denied;
    /// an absent complaint reads as not found. The result embeds the
    /// consumer, the assignee, the tenant, and each update's author.
    ///
    /// # Errors
    ///
    /// Returns an error if the complaint is absent or invisible, or the
    /// database query fails.
    pub async fn find_visible(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
    ) -> Result<ComplaintDetail, LifecycleError> {
        let complaint = self.fetch_visible(actor, complaint_id).await?;

        let consumer = users::Entity::find_by_id(complaint.consumer_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let assignee = match complaint.assigned_to {
            Some(assignee_id) => users::Entity::find_by_id(assignee_id)
                .one(&self.db)
                .await
                .map_err(db_err)?,
            None => None,
        };
        let tenant = tenants::Entity::find_by_id(complaint.tenant_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let updates = complaint_updates::Entity::find()
            .filter(complaint_updates::Column::ComplaintId.eq(complaint_id))
            .find_also_related(users::Entity)
            .order_by_asc(complaint_updates::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ComplaintDetail {
            complaint,
            consumer,
            assignee,
            tenant,
            updates,
        })
    }

    /// Assigns a complaint to a support person.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not assign, the complaint is
    /// invisible to them, the assignee is unsuitable, or the database
    /// operation fails.
    pub async fn assign(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
        assignee_id: Uuid,
    ) -> Result<complaints::Model, LifecycleError> {
        let complaint = self.fetch(complaint_id).await?;
        let state = state_of(&complaint);

        let assignee = users::Entity::find_by_id(assignee_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LifecycleError::InvalidAssignee(assignee_id))?;

        let assignee = Assignee {
            id: assignee.id,
            role: role_to_core(&assignee.role),
            tenant_id: assignee.tenant_id,
            display_name: format!("{} {}", assignee.first_name, assignee.last_name),
        };

        let action = self.engine.assign(actor, &state, &assignee)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let now = Utc::now().into();
        let mut active: complaints::ActiveModel = complaint.into();
        active.assigned_to = Set(Some(action.assigned_to));
        active.status = Set(status_to_db(action.new_status));
        active.updated_at = Set(now);

        let updated = active.update(&txn).await.map_err(db_err)?;
        insert_audit(&txn, complaint_id, &action.audit).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(updated)
    }

    /// Changes a complaint's status, recording an audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not update status, the complaint
    /// is invisible to them, the transition is invalid, or the database
    /// operation fails.
    pub async fn update_status(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
        new_status: ComplaintStatus,
        note: Option<&str>,
    ) -> Result<complaints::Model, LifecycleError> {
        let complaint = self.fetch(complaint_id).await?;
        let state = state_of(&complaint);

        let action = self.engine.update_status(actor, &state, new_status, note)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let mut active: complaints::ActiveModel = complaint.into();
        active.status = Set(status_to_db(action.new_status));
        if let Some(resolved_at) = action.resolved_at {
            active.resolved_at = Set(Some(resolved_at.into()));
        }
        if let Some(closed_at) = action.closed_at {
            active.closed_at = Set(Some(closed_at.into()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await.map_err(db_err)?;
        insert_audit(&txn, complaint_id, &action.audit).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(updated)
    }

    /// Appends a progress note without changing status.
    ///
    /// # Errors
    ///
    /// Returns an error if the complaint is invisible to the actor, the
    /// note is empty, or the database operation fails.
    pub async fn add_note(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
        note: &str,
    ) -> Result<complaint_updates::Model, LifecycleError> {
        let complaint = self.fetch(complaint_id).await?;
        let state = state_of(&complaint);

        let action = self.engine.add_note(actor, &state, note)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let mut active: complaints::ActiveModel = complaint.into();
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await.map_err(db_err)?;

        let entry = insert_audit(&txn, complaint_id, &action.audit).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(entry)
    }

    /// Consumer confirms a resolution, closing the complaint.
    ///
    /// Marks the latest resolution entry as confirmed, records the optional
    /// feedback on it, moves the complaint to `closed`, and appends the
    /// closure audit entry, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not the filing consumer, the
    /// complaint is not awaiting confirmation, or the database operation
    /// fails.
    pub async fn confirm_resolution(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
        feedback: Option<&str>,
    ) -> Result<complaints::Model, LifecycleError> {
        let complaint = self.fetch(complaint_id).await?;
        let state = state_of(&complaint);

        let action = self.engine.confirm_resolution(actor, &state, feedback)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let resolution = complaint_updates::Entity::find()
            .filter(complaint_updates::Column::ComplaintId.eq(complaint_id))
            .filter(complaint_updates::Column::IsResolution.eq(true))
            .order_by_desc(complaint_updates::Column::CreatedAt)
            .one(&txn)
            .await
            .map_err(db_err)?;

        if let Some(resolution) = resolution {
            let mut active: complaint_updates::ActiveModel = resolution.into();
            active.consumer_confirmed = Set(Some(true));
            active.consumer_feedback = Set(action.feedback.clone());
            active.update(&txn).await.map_err(db_err)?;
        }

        let now = Utc::now().into();
        let mut active: complaints::ActiveModel = complaint.into();
        active.status = Set(status_to_db(action.new_status));
        if state.closed_at.is_none() {
            active.closed_at = Set(Some(action.closed_at.into()));
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await.map_err(db_err)?;
        insert_audit(&txn, complaint_id, &action.audit).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(updated)
    }

    /// Lists the complaints a consumer has filed, newest first.
    ///
    /// Consumers may only list their own complaints.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not the named consumer or the
    /// database query fails.
    pub async fn list_by_consumer(
        &self,
        actor: &Actor,
        consumer_id: Uuid,
    ) -> Result<Vec<complaints::Model>, LifecycleError> {
        authorize(actor, Operation::ListConsumerComplaints)?;
        if consumer_id != actor.user_id {
            return Err(LifecycleError::AccessDenied(
                "consumers may only list their own complaints".to_string(),
            ));
        }

        self.list(actor, None, None).await
    }

    /// Lists every complaint of a tenant, newest first.
    ///
    /// Agents and managers may only list their own tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor belongs to a different tenant or the
    /// database query fails.
    pub async fn list_by_tenant(
        &self,
        actor: &Actor,
        tenant_id: Uuid,
    ) -> Result<Vec<complaints::Model>, LifecycleError> {
        authorize(actor, Operation::ListTenantComplaints)?;
        if actor.tenant_id != Some(tenant_id) {
            return Err(LifecycleError::AccessDenied(
                "you may only list complaints of your own tenant".to_string(),
            ));
        }

        complaints::Entity::find()
            .filter(complaints::Column::TenantId.eq(tenant_id))
            .order_by_desc(complaints::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Fetches a complaint, enforcing the actor's visibility scope.
    async fn fetch_visible(
        &self,
        actor: &Actor,
        complaint_id: Uuid,
    ) -> Result<complaints::Model, LifecycleError> {
        let complaint = self.fetch(complaint_id).await?;
        self.engine.view(actor, Some(&state_of(&complaint)))?;
        Ok(complaint)
    }

    async fn fetch(&self, complaint_id: Uuid) -> Result<complaints::Model, LifecycleError> {
        complaints::Entity::find_by_id(complaint_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LifecycleError::ComplaintNotFound(complaint_id))
    }
}

/// Inserts an audit entry within the given transaction.
async fn insert_audit(
    txn: &sea_orm::DatabaseTransaction,
    complaint_id: Uuid,
    audit: &AuditEntry,
) -> Result<complaint_updates::Model, LifecycleError> {
    let entry = complaint_updates::ActiveModel {
        id: Set(Uuid::new_v4()),
        complaint_id: Set(complaint_id),
        status_changed_to: Set(audit.status_changed_to.map(status_to_db)),
        note: Set(audit.note.clone()),
        is_resolution: Set(audit.is_resolution),
        consumer_confirmed: Set(None),
        consumer_feedback: Set(None),
        updated_by: Set(audit.updated_by),
        created_at: Set(Utc::now().into()),
    };

    entry.insert(txn).await.map_err(db_err)
}

/// Builds the engine's snapshot from a complaint row.
fn state_of(complaint: &complaints::Model) -> ComplaintState {
    ComplaintState {
        id: complaint.id,
        tenant_id: complaint.tenant_id,
        consumer_id: complaint.consumer_id,
        assigned_to: complaint.assigned_to,
        status: status_to_core(&complaint.status),
        resolved_at: complaint.resolved_at.map(Into::into),
        closed_at: complaint.closed_at.map(Into::into),
    }
}

fn db_err(err: sea_orm::DbErr) -> LifecycleError {
    LifecycleError::Database(err.to_string())
}

/// Converts a database status to the core status.
#[must_use]
pub const fn status_to_core(status: &DbStatus) -> ComplaintStatus {
    match status {
        DbStatus::Logged => ComplaintStatus::Logged,
        DbStatus::Assigned => ComplaintStatus::Assigned,
        DbStatus::InProgress => ComplaintStatus::InProgress,
        DbStatus::Resolved => ComplaintStatus::Resolved,
        DbStatus::Closed => ComplaintStatus::Closed,
    }
}

/// Converts a core status to the database status.
#[must_use]
pub const fn status_to_db(status: ComplaintStatus) -> DbStatus {
    match status {
        ComplaintStatus::Logged => DbStatus::Logged,
        ComplaintStatus::Assigned => DbStatus::Assigned,
        ComplaintStatus::InProgress => DbStatus::InProgress,
        ComplaintStatus::Resolved => DbStatus::Resolved,
        ComplaintStatus::Closed => DbStatus::Closed,
    }
}

/// Converts a core priority to the database priority.
#[must_use]
pub const fn priority_to_db(priority: Priority) -> DbPriority {
    match priority {
        Priority::Low => DbPriority::Low,
        Priority::Medium => DbPriority::Medium,
        Priority::High => DbPriority::High,
    }
}

/// Converts a database role to the core role.
#[must_use]
pub const fn role_to_core(role: &UserRole) -> Role {
    match role {
        UserRole::Admin => Role::Admin,
        UserRole::Consumer => Role::Consumer,
        UserRole::HelpdeskAgent => Role::HelpdeskAgent,
        UserRole::SupportPerson => Role::SupportPerson,
        UserRole::HelpdeskManager => Role::HelpdeskManager,
    }
}

/// Converts a core role to the database role.
#[must_use]
pub const fn role_to_db(role: Role) -> UserRole {
    match role {
        Role::Admin => UserRole::Admin,
        Role::Consumer => UserRole::Consumer,
        Role::HelpdeskAgent => UserRole::HelpdeskAgent,
        Role::SupportPerson => UserRole::SupportPerson,
        Role::HelpdeskManager => UserRole::HelpdeskManager,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_round_trips() {
        for status in [
            ComplaintStatus::Logged,
            ComplaintStatus::Assigned,
            ComplaintStatus::InProgress,
            ComplaintStatus::Resolved,
            ComplaintStatus::Closed,
        ] {
            assert_eq!(status_to_core(&status_to_db(status)), status);
        }
    }

    #[test]
    fn test_role_conversion_round_trips() {
        for role in [
            Role::Admin,
            Role::Consumer,
            Role::HelpdeskAgent,
            Role::SupportPerson,
            Role::HelpdeskManager,
        ] {
            assert_eq!(role_to_core(&role_to_db(role)), role);
        }
    }
}
