//! Authorization policy.
//!
//! A single capability table decides which roles may attempt which
//! operations, and a single [`VisibilityScope`] predicate decides which
//! complaints an actor can see. List and fetch-by-id share the same scope,
//! so an actor can never fetch a complaint that would not appear in their
//! list.

use std::fmt;
use uuid::Uuid;

use super::error::LifecycleError;
use super::types::{Actor, ComplaintState, Role};

/// Every operation the policy table governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// File a new complaint.
    CreateComplaint,
    /// List complaints within the actor's visibility.
    ListComplaints,
    /// List a consumer's own complaints.
    ListConsumerComplaints,
    /// List every complaint of a tenant.
    ListTenantComplaints,
    /// Fetch a single complaint.
    GetComplaint,
    /// Assign a complaint to a support person.
    AssignComplaint,
    /// Change a complaint's status.
    UpdateStatus,
    /// Append a progress note without changing status.
    AddNote,
    /// Consumer confirms a resolution, closing the complaint.
    ConfirmResolution,
    /// Create a tenant.
    CreateTenant,
    /// List all tenants.
    ListTenants,
    /// Fetch a single tenant.
    GetTenant,
    /// Update a tenant's name, type, or status.
    UpdateTenant,
    /// Deactivate a tenant (status flip to inactive).
    DeleteTenant,
    /// Create a staff account (ha, sp, or hm).
    CreateStaff,
    /// List user accounts across all tenants.
    ListUsers,
    /// List the user accounts of one tenant.
    ListTenantUsers,
    /// Fetch a single user account.
    GetUser,
    /// Update a user's profile fields.
    UpdateUser,
    /// Hard-delete a user account.
    DeleteUser,
}

impl Operation {
    /// Returns a human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateComplaint => "create complaint",
            Self::ListComplaints => "list complaints",
            Self::ListConsumerComplaints => "list consumer complaints",
            Self::ListTenantComplaints => "list tenant complaints",
            Self::GetComplaint => "view complaint",
            Self::AssignComplaint => "assign complaint",
            Self::UpdateStatus => "update complaint status",
            Self::AddNote => "add complaint note",
            Self::ConfirmResolution => "confirm resolution",
            Self::CreateTenant => "create tenant",
            Self::ListTenants => "list tenants",
            Self::GetTenant => "view tenant",
            Self::UpdateTenant => "update tenant",
            Self::DeleteTenant => "delete tenant",
            Self::CreateStaff => "create staff account",
            Self::ListUsers => "list users",
            Self::ListTenantUsers => "list tenant users",
            Self::GetUser => "view user",
            Self::UpdateUser => "update user",
            Self::DeleteUser => "delete user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The capability table: may `role` attempt `operation` at all?
///
/// This answers the role question only. Per-resource checks (tenant scope,
/// ownership, assignment) come after, from [`VisibilityScope`] and the
/// engine itself.
#[must_use]
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    use Operation as Op;
    use Role::{Admin, Consumer, HelpdeskAgent, HelpdeskManager, SupportPerson};

    match operation {
        Op::CreateComplaint | Op::ConfirmResolution | Op::ListConsumerComplaints => {
            matches!(role, Consumer)
        }
        Op::ListComplaints | Op::GetComplaint | Op::UpdateUser | Op::GetUser => true,
        Op::AssignComplaint | Op::ListTenantComplaints => {
            matches!(role, HelpdeskAgent | HelpdeskManager)
        }
        Op::UpdateStatus | Op::AddNote => {
            matches!(role, SupportPerson | HelpdeskAgent | HelpdeskManager | Admin)
        }
        Op::CreateTenant | Op::UpdateTenant | Op::DeleteTenant | Op::CreateStaff => {
            matches!(role, Admin)
        }
        Op::ListTenants | Op::GetTenant | Op::ListUsers | Op::DeleteUser => matches!(role, Admin),
        Op::ListTenantUsers => matches!(role, Admin | HelpdeskAgent | HelpdeskManager),
    }
}

/// Checks the capability table, producing a typed error on denial.
///
/// # Errors
///
/// Returns [`LifecycleError::RoleNotAllowed`] when the role may not attempt
/// the operation.
pub fn authorize(actor: &Actor, operation: Operation) -> Result<(), LifecycleError> {
    if is_allowed(actor.role, operation) {
        Ok(())
    } else {
        Err(LifecycleError::RoleNotAllowed {
            role: actor.role.to_string(),
            operation: operation.to_string(),
        })
    }
}

/// Which complaints an actor can see.
///
/// Derived once per request from the actor and applied identically to list
/// queries and single fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Admin: every complaint across all tenants.
    All,
    /// Helpdesk agent / manager: every complaint in their tenant.
    Tenant(Uuid),
    /// Support person: complaints in their tenant assigned to them.
    AssignedTo {
        /// The staff member's tenant.
        tenant_id: Uuid,
        /// The staff member.
        user_id: Uuid,
    },
    /// Consumer: their own complaints in their tenant.
    OwnedBy {
        /// The consumer's tenant.
        tenant_id: Uuid,
        /// The consumer.
        user_id: Uuid,
    },
}

impl VisibilityScope {
    /// Derives the visibility scope for an actor.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AccessDenied`] if a non-admin actor carries
    /// no tenant, which indicates a corrupted token or account.
    pub fn for_actor(actor: &Actor) -> Result<Self, LifecycleError> {
        if actor.role == Role::Admin {
            return Ok(Self::All);
        }

        let tenant_id = actor
            .tenant_id
            .ok_or_else(|| LifecycleError::AccessDenied("account has no tenant".to_string()))?;

        Ok(match actor.role {
            Role::Admin => Self::All,
            Role::HelpdeskAgent | Role::HelpdeskManager => Self::Tenant(tenant_id),
            Role::SupportPerson => Self::AssignedTo {
                tenant_id,
                user_id: actor.user_id,
            },
            Role::Consumer => Self::OwnedBy {
                tenant_id,
                user_id: actor.user_id,
            },
        })
    }

    /// Returns true if this scope permits seeing the given complaint.
    #[must_use]
    pub fn permits(&self, complaint: &ComplaintState) -> bool {
        match self {
            Self::All => true,
            Self::Tenant(tenant_id) => complaint.tenant_id == *tenant_id,
            Self::AssignedTo { tenant_id, user_id } => {
                complaint.tenant_id == *tenant_id && complaint.assigned_to == Some(*user_id)
            }
            Self::OwnedBy { tenant_id, user_id } => {
                complaint.tenant_id == *tenant_id && complaint.consumer_id == *user_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::types::ComplaintStatus;

    fn actor(role: Role, tenant_id: Option<Uuid>) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
            tenant_id,
        }
    }

    fn complaint(tenant_id: Uuid, consumer_id: Uuid, assigned_to: Option<Uuid>) -> ComplaintState {
        ComplaintState {
            id: Uuid::new_v4(),
            tenant_id,
            consumer_id,
            assigned_to,
            status: ComplaintStatus::Logged,
            resolved_at: None,
            closed_at: None,
        }
    }

    #[test]
    fn test_only_consumers_create_and_confirm() {
        assert!(is_allowed(Role::Consumer, Operation::CreateComplaint));
        assert!(is_allowed(Role::Consumer, Operation::ConfirmResolution));
        for role in [
            Role::Admin,
            Role::HelpdeskAgent,
            Role::SupportPerson,
            Role::HelpdeskManager,
        ] {
            assert!(!is_allowed(role, Operation::CreateComplaint));
            assert!(!is_allowed(role, Operation::ConfirmResolution));
        }
    }

    #[test]
    fn test_only_agents_and_managers_assign() {
        assert!(is_allowed(Role::HelpdeskAgent, Operation::AssignComplaint));
        assert!(is_allowed(Role::HelpdeskManager, Operation::AssignComplaint));
        assert!(!is_allowed(Role::Consumer, Operation::AssignComplaint));
        assert!(!is_allowed(Role::SupportPerson, Operation::AssignComplaint));
        assert!(!is_allowed(Role::Admin, Operation::AssignComplaint));
    }

    #[test]
    fn test_consumers_cannot_update_status_or_add_notes() {
        for op in [Operation::UpdateStatus, Operation::AddNote] {
            assert!(!is_allowed(Role::Consumer, op));
            assert!(is_allowed(Role::SupportPerson, op));
            assert!(is_allowed(Role::HelpdeskAgent, op));
            assert!(is_allowed(Role::HelpdeskManager, op));
            assert!(is_allowed(Role::Admin, op));
        }
    }

    #[test]
    fn test_user_listing_capabilities() {
        assert!(is_allowed(Role::Admin, Operation::ListUsers));
        assert!(!is_allowed(Role::HelpdeskManager, Operation::ListUsers));

        assert!(is_allowed(Role::Admin, Operation::ListTenantUsers));
        assert!(is_allowed(Role::HelpdeskAgent, Operation::ListTenantUsers));
        assert!(is_allowed(Role::HelpdeskManager, Operation::ListTenantUsers));
        assert!(!is_allowed(Role::SupportPerson, Operation::ListTenantUsers));
        assert!(!is_allowed(Role::Consumer, Operation::ListTenantUsers));
    }

    #[test]
    fn test_only_admin_deletes_users() {
        for role in [
            Role::Consumer,
            Role::HelpdeskAgent,
            Role::SupportPerson,
            Role::HelpdeskManager,
        ] {
            assert!(!is_allowed(role, Operation::DeleteUser));
        }
        assert!(is_allowed(Role::Admin, Operation::DeleteUser));
    }

    #[test]
    fn test_scoped_complaint_listings() {
        assert!(is_allowed(Role::Consumer, Operation::ListConsumerComplaints));
        assert!(!is_allowed(Role::HelpdeskAgent, Operation::ListConsumerComplaints));

        assert!(is_allowed(Role::HelpdeskAgent, Operation::ListTenantComplaints));
        assert!(is_allowed(Role::HelpdeskManager, Operation::ListTenantComplaints));
        assert!(!is_allowed(Role::SupportPerson, Operation::ListTenantComplaints));
        assert!(!is_allowed(Role::Consumer, Operation::ListTenantComplaints));
    }

    #[test]
    fn test_tenant_management_is_admin_only() {
        for op in [
            Operation::CreateTenant,
            Operation::ListTenants,
            Operation::GetTenant,
            Operation::UpdateTenant,
            Operation::DeleteTenant,
            Operation::CreateStaff,
        ] {
            assert!(is_allowed(Role::Admin, op));
            assert!(!is_allowed(Role::Consumer, op));
            assert!(!is_allowed(Role::HelpdeskAgent, op));
            assert!(!is_allowed(Role::SupportPerson, op));
            assert!(!is_allowed(Role::HelpdeskManager, op));
        }
    }

    #[test]
    fn test_authorize_produces_role_not_allowed() {
        let sp = actor(Role::SupportPerson, Some(Uuid::new_v4()));
        let err = authorize(&sp, Operation::AssignComplaint).unwrap_err();
        assert!(matches!(err, LifecycleError::RoleNotAllowed { .. }));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_admin_scope_sees_everything() {
        let admin = actor(Role::Admin, None);
        let scope = VisibilityScope::for_actor(&admin).unwrap();
        assert_eq!(scope, VisibilityScope::All);
        assert!(scope.permits(&complaint(Uuid::new_v4(), Uuid::new_v4(), None)));
    }

    #[test]
    fn test_agent_scope_is_tenant_wide() {
        let tenant = Uuid::new_v4();
        let agent = actor(Role::HelpdeskAgent, Some(tenant));
        let scope = VisibilityScope::for_actor(&agent).unwrap();

        assert!(scope.permits(&complaint(tenant, Uuid::new_v4(), None)));
        assert!(!scope.permits(&complaint(Uuid::new_v4(), Uuid::new_v4(), None)));
    }

    #[test]
    fn test_support_scope_requires_assignment() {
        let tenant = Uuid::new_v4();
        let sp = actor(Role::SupportPerson, Some(tenant));
        let scope = VisibilityScope::for_actor(&sp).unwrap();

        assert!(scope.permits(&complaint(tenant, Uuid::new_v4(), Some(sp.user_id))));
        assert!(!scope.permits(&complaint(tenant, Uuid::new_v4(), None)));
        assert!(!scope.permits(&complaint(tenant, Uuid::new_v4(), Some(Uuid::new_v4()))));
        // Assignment in another tenant does not leak across.
        assert!(!scope.permits(&complaint(Uuid::new_v4(), Uuid::new_v4(), Some(sp.user_id))));
    }

    #[test]
    fn test_consumer_scope_requires_ownership() {
        let tenant = Uuid::new_v4();
        let consumer = actor(Role::Consumer, Some(tenant));
        let scope = VisibilityScope::for_actor(&consumer).unwrap();

        assert!(scope.permits(&complaint(tenant, consumer.user_id, None)));
        assert!(!scope.permits(&complaint(tenant, Uuid::new_v4(), None)));
        assert!(!scope.permits(&complaint(Uuid::new_v4(), consumer.user_id, None)));
    }

    #[test]
    fn test_non_admin_without_tenant_is_denied() {
        let broken = actor(Role::Consumer, None);
        let err = VisibilityScope::for_actor(&broken).unwrap_err();
        assert!(matches!(err, LifecycleError::AccessDenied(_)));
    }
}
