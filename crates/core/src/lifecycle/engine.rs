//! The complaint lifecycle engine.
//!
//! Stateless validation of every state change. Callers fetch the current
//! complaint snapshot, ask the engine for a validated action, and persist
//! the action together with its audit entry in one transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::LifecycleError;
use super::policy::{self, Operation, VisibilityScope};
use super::types::{Actor, Assignee, ComplaintState, ComplaintStatus, Role};

/// How status changes are constrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be set at any time, including re-setting the current
    /// status and reopening a closed complaint.
    #[default]
    Permissive,
    /// Only forward moves along the lifecycle order are allowed.
    Strict,
}

impl TransitionPolicy {
    /// Returns true if a change from `from` to `to` is allowed.
    #[must_use]
    pub fn allows(&self, from: ComplaintStatus, to: ComplaintStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => to.position() > from.position(),
        }
    }
}

/// An audit entry accompanying a state change.
///
/// Persisted as a complaint-update row in the same transaction as the
/// complaint mutation it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Status the complaint moved to, absent for plain notes.
    pub status_changed_to: Option<ComplaintStatus>,
    /// Human-readable note.
    pub note: String,
    /// True exactly when the recorded transition is to `resolved`.
    pub is_resolution: bool,
    /// The user responsible for the change.
    pub updated_by: Uuid,
}

impl AuditEntry {
    fn transition(status: ComplaintStatus, note: String, updated_by: Uuid) -> Self {
        Self {
            status_changed_to: Some(status),
            note,
            is_resolution: status == ComplaintStatus::Resolved,
            updated_by,
        }
    }
}

/// Validated outcome of filing a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAction {
    /// Status the new complaint starts in (always `logged`).
    pub status: ComplaintStatus,
    /// The initial audit entry.
    pub audit: AuditEntry,
}

/// Validated outcome of assigning a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignAction {
    /// The support person to assign.
    pub assigned_to: Uuid,
    /// Status after the assignment (always `assigned`).
    pub new_status: ComplaintStatus,
    /// The audit entry recording the assignment.
    pub audit: AuditEntry,
}

/// Validated outcome of a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAction {
    /// The status to move to.
    pub new_status: ComplaintStatus,
    /// Resolution timestamp to set, if this change first reaches `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Closure timestamp to set, if this change first reaches `closed`.
    pub closed_at: Option<DateTime<Utc>>,
    /// The audit entry recording the change.
    pub audit: AuditEntry,
}

/// Validated outcome of adding a progress note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAction {
    /// The audit entry carrying the note. Status is unchanged.
    pub audit: AuditEntry,
}

/// Validated outcome of a consumer confirming a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmAction {
    /// Status after confirmation (always `closed`).
    pub new_status: ComplaintStatus,
    /// Closure timestamp to set.
    pub closed_at: DateTime<Utc>,
    /// Optional consumer feedback recorded on the resolution entry.
    pub feedback: Option<String>,
    /// The audit entry recording the closure.
    pub audit: AuditEntry,
}

/// The lifecycle engine.
///
/// Holds only the configured transition policy; all other inputs arrive
/// per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleEngine {
    policy: TransitionPolicy,
}

impl LifecycleEngine {
    /// Creates an engine with the given transition policy.
    #[must_use]
    pub const fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    /// Validates filing a new complaint.
    ///
    /// Only consumers may file; the complaint lands in `logged` with an
    /// initial audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a consumer or the payload is
    /// empty.
    pub fn create(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
    ) -> Result<CreateAction, LifecycleError> {
        policy::authorize(actor, Operation::CreateComplaint)?;

        if title.trim().is_empty() {
            return Err(LifecycleError::Validation("title is required".to_string()));
        }
        if description.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "description is required".to_string(),
            ));
        }

        Ok(CreateAction {
            status: ComplaintStatus::Logged,
            audit: AuditEntry::transition(
                ComplaintStatus::Logged,
                "Complaint logged by consumer".to_string(),
                actor.user_id,
            ),
        })
    }

    /// Validates fetching a single complaint.
    ///
    /// Existence is checked first, then the actor's visibility scope. An
    /// absent complaint reads as not found; an existing complaint outside
    /// the scope is rejected with access denied.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ComplaintNotFound`] when the complaint is
    /// absent and [`LifecycleError::AccessDenied`] when it is invisible to
    /// the actor.
    pub fn view(
        &self,
        actor: &Actor,
        complaint: Option<&ComplaintState>,
    ) -> Result<(), LifecycleError> {
        policy::authorize(actor, Operation::GetComplaint)?;

        let Some(complaint) = complaint else {
            return Err(LifecycleError::ComplaintNotFound(Uuid::nil()));
        };

        let scope = VisibilityScope::for_actor(actor)?;
        if scope.permits(complaint) {
            Ok(())
        } else {
            Err(scope_denied())
        }
    }

    /// Validates assigning a complaint to a support person.
    ///
    /// The assignee must be a support person in the complaint's tenant; the
    /// complaint moves to `assigned`. Re-assignment of an already assigned
    /// complaint is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error when the actor may not assign, the complaint is
    /// outside their tenant, the assignee is unsuitable, or the complaint
    /// cannot move to `assigned`.
    pub fn assign(
        &self,
        actor: &Actor,
        complaint: &ComplaintState,
        assignee: &Assignee,
    ) -> Result<AssignAction, LifecycleError> {
        policy::authorize(actor, Operation::AssignComplaint)?;

        let scope = VisibilityScope::for_actor(actor)?;
        if !scope.permits(complaint) {
            return Err(scope_denied());
        }

        if assignee.role != Role::SupportPerson {
            return Err(LifecycleError::InvalidAssignee(assignee.id));
        }
        if assignee.tenant_id != Some(complaint.tenant_id) {
            return Err(LifecycleError::AssigneeTenantMismatch(assignee.id));
        }

        // Re-assignment keeps the status; otherwise the move to `assigned`
        // must be a valid transition.
        if complaint.status != ComplaintStatus::Assigned
            && !self.policy.allows(complaint.status, ComplaintStatus::Assigned)
        {
            return Err(LifecycleError::InvalidTransition {
                from: complaint.status,
                to: ComplaintStatus::Assigned,
            });
        }

        Ok(AssignAction {
            assigned_to: assignee.id,
            new_status: ComplaintStatus::Assigned,
            audit: AuditEntry::transition(
                ComplaintStatus::Assigned,
                format!("Complaint assigned to {}", assignee.display_name),
                actor.user_id,
            ),
        })
    }

    /// Validates a status change.
    ///
    /// The `resolved_at` and `closed_at` timestamps are set only the first
    /// time the complaint reaches those statuses.
    ///
    /// # Errors
    ///
    /// Returns an error when the actor may not update status, the complaint
    /// belongs to another tenant, or the change violates the transition
    /// policy.
    pub fn update_status(
        &self,
        actor: &Actor,
        complaint: &ComplaintState,
        new_status: ComplaintStatus,
        note: Option<&str>,
    ) -> Result<StatusAction, LifecycleError> {
        policy::authorize(actor, Operation::UpdateStatus)?;

        if !same_tenant(actor, complaint) {
            return Err(scope_denied());
        }

        if !self.policy.allows(complaint.status, new_status) {
            return Err(LifecycleError::InvalidTransition {
                from: complaint.status,
                to: new_status,
            });
        }

        let now = Utc::now();
        let resolved_at = (new_status == ComplaintStatus::Resolved
            && complaint.resolved_at.is_none())
        .then_some(now);
        let closed_at =
            (new_status == ComplaintStatus::Closed && complaint.closed_at.is_none()).then_some(now);

        let note = match note {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("Status changed to {new_status}"),
        };

        Ok(StatusAction {
            new_status,
            resolved_at,
            closed_at,
            audit: AuditEntry::transition(new_status, note, actor.user_id),
        })
    }

    /// Validates adding a progress note without changing status.
    ///
    /// # Errors
    ///
    /// Returns an error when the complaint belongs to another tenant or the
    /// note is empty.
    pub fn add_note(
        &self,
        actor: &Actor,
        complaint: &ComplaintState,
        note: &str,
    ) -> Result<NoteAction, LifecycleError> {
        policy::authorize(actor, Operation::AddNote)?;

        if !same_tenant(actor, complaint) {
            return Err(scope_denied());
        }

        if note.trim().is_empty() {
            return Err(LifecycleError::Validation("note is required".to_string()));
        }

        Ok(NoteAction {
            audit: AuditEntry {
                status_changed_to: None,
                note: note.to_string(),
                is_resolution: false,
                updated_by: actor.user_id,
            },
        })
    }

    /// Validates a consumer confirming a resolution.
    ///
    /// Only the filing consumer may confirm, and only while the complaint is
    /// `resolved`. Confirmation closes the complaint.
    ///
    /// # Errors
    ///
    /// Returns an error when the actor is not the owner or the complaint is
    /// not awaiting confirmation.
    pub fn confirm_resolution(
        &self,
        actor: &Actor,
        complaint: &ComplaintState,
        feedback: Option<&str>,
    ) -> Result<ConfirmAction, LifecycleError> {
        policy::authorize(actor, Operation::ConfirmResolution)?;

        let scope = VisibilityScope::for_actor(actor)?;
        if !scope.permits(complaint) {
            return Err(scope_denied());
        }

        if complaint.consumer_id != actor.user_id {
            return Err(LifecycleError::AccessDenied(
                "only the filing consumer can confirm a resolution".to_string(),
            ));
        }

        if complaint.status != ComplaintStatus::Resolved {
            return Err(LifecycleError::InvalidStatus {
                expected: ComplaintStatus::Resolved,
                actual: complaint.status,
            });
        }

        let feedback = feedback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(ToString::to_string);

        Ok(ConfirmAction {
            new_status: ComplaintStatus::Closed,
            closed_at: Utc::now(),
            feedback,
            audit: AuditEntry::transition(
                ComplaintStatus::Closed,
                "Resolution confirmed by consumer".to_string(),
                actor.user_id,
            ),
        })
    }
}

/// The rejection for a complaint that exists but sits outside the actor's
/// visibility scope. The message never reveals complaint details.
fn scope_denied() -> LifecycleError {
    LifecycleError::AccessDenied("you do not have access to this complaint".to_string())
}

/// Staff status updates and notes are tenant-scoped: any staff member of
/// the complaint's tenant (or the admin) may act, regardless of who the
/// complaint is assigned to. The per-assignee restriction is a visibility
/// rule for reads, not a mutation guard.
fn same_tenant(actor: &Actor, complaint: &ComplaintState) -> bool {
    actor.role == Role::Admin || actor.tenant_id == Some(complaint.tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn consumer(tenant: Uuid) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role: Role::Consumer,
            tenant_id: Some(tenant),
        }
    }

    fn agent(tenant: Uuid) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role: Role::HelpdeskAgent,
            tenant_id: Some(tenant),
        }
    }

    fn support(tenant: Uuid) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role: Role::SupportPerson,
            tenant_id: Some(tenant),
        }
    }

    fn complaint(tenant: Uuid, consumer_id: Uuid, status: ComplaintStatus) -> ComplaintState {
        ComplaintState {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            consumer_id,
            assigned_to: None,
            status,
            resolved_at: None,
            closed_at: None,
        }
    }

    fn support_assignee(tenant: Uuid) -> Assignee {
        Assignee {
            id: Uuid::new_v4(),
            role: Role::SupportPerson,
            tenant_id: Some(tenant),
            display_name: "Dana Reyes".to_string(),
        }
    }

    #[test]
    fn test_consumer_files_complaint() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = consumer(tenant);

        let action = engine
            .create(&actor, "Broken card reader", "The reader rejects my card")
            .unwrap();

        assert_eq!(action.status, ComplaintStatus::Logged);
        assert_eq!(action.audit.note, "Complaint logged by consumer");
        assert_eq!(action.audit.status_changed_to, Some(ComplaintStatus::Logged));
        assert!(!action.audit.is_resolution);
        assert_eq!(action.audit.updated_by, actor.user_id);
    }

    #[test]
    fn test_staff_cannot_file_complaint() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();

        let err = engine
            .create(&agent(tenant), "title", "description")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::RoleNotAllowed { .. }));
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let engine = LifecycleEngine::default();
        let actor = consumer(Uuid::new_v4());

        assert!(matches!(
            engine.create(&actor, "  ", "description"),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            engine.create(&actor, "title", ""),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn test_agent_assigns_to_support_person() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Logged);
        let assignee = support_assignee(tenant);

        let action = engine.assign(&actor, &c, &assignee).unwrap();

        assert_eq!(action.assigned_to, assignee.id);
        assert_eq!(action.new_status, ComplaintStatus::Assigned);
        assert_eq!(action.audit.note, "Complaint assigned to Dana Reyes");
    }

    #[test]
    fn test_assign_rejects_non_support_assignee() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Logged);
        let mut assignee = support_assignee(tenant);
        assignee.role = Role::HelpdeskAgent;

        let err = engine.assign(&agent(tenant), &c, &assignee).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidAssignee(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_assign_rejects_cross_tenant_assignee() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Logged);
        let assignee = support_assignee(Uuid::new_v4());

        let err = engine.assign(&agent(tenant), &c, &assignee).unwrap_err();
        assert!(matches!(err, LifecycleError::AssigneeTenantMismatch(_)));
    }

    #[test]
    fn test_assign_outside_tenant_is_denied() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let c = complaint(other, Uuid::new_v4(), ComplaintStatus::Logged);

        let err = engine
            .assign(&agent(tenant), &c, &support_assignee(other))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::AccessDenied(_)));
    }

    #[test]
    fn test_reassignment_is_allowed() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Assigned);
        c.assigned_to = Some(Uuid::new_v4());

        let action = engine
            .assign(&agent(tenant), &c, &support_assignee(tenant))
            .unwrap();
        assert_eq!(action.new_status, ComplaintStatus::Assigned);
    }

    #[test]
    fn test_strict_policy_blocks_assigning_closed_complaint() {
        let engine = LifecycleEngine::new(TransitionPolicy::Strict);
        let tenant = Uuid::new_v4();
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Closed);

        let err = engine
            .assign(&agent(tenant), &c, &support_assignee(tenant))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

        // The permissive default lets a closed complaint be re-assigned.
        let permissive = LifecycleEngine::default();
        assert!(
            permissive
                .assign(&agent(tenant), &c, &support_assignee(tenant))
                .is_ok()
        );
    }

    #[test]
    fn test_assigned_support_updates_status() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let sp = support(tenant);
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Assigned);
        c.assigned_to = Some(sp.user_id);

        let action = engine
            .update_status(&sp, &c, ComplaintStatus::InProgress, None)
            .unwrap();

        assert_eq!(action.new_status, ComplaintStatus::InProgress);
        assert_eq!(action.audit.note, "Status changed to in_progress");
        assert!(action.resolved_at.is_none());
        assert!(action.closed_at.is_none());
    }

    #[test]
    fn test_support_updates_colleague_assigned_complaint() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let sp = support(tenant);
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Assigned);
        c.assigned_to = Some(Uuid::new_v4());

        // Status updates are tenant-scoped, not assignee-scoped.
        let action = engine
            .update_status(&sp, &c, ComplaintStatus::InProgress, None)
            .unwrap();
        assert_eq!(action.new_status, ComplaintStatus::InProgress);
    }

    #[test]
    fn test_cross_tenant_support_cannot_update_status() {
        let engine = LifecycleEngine::default();
        let sp = support(Uuid::new_v4());
        let c = complaint(Uuid::new_v4(), Uuid::new_v4(), ComplaintStatus::Assigned);

        let err = engine
            .update_status(&sp, &c, ComplaintStatus::InProgress, None)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::AccessDenied(_)));
    }

    #[test]
    fn test_resolving_sets_resolution_flag_and_timestamp() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let sp = support(tenant);
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::InProgress);
        c.assigned_to = Some(sp.user_id);

        let action = engine
            .update_status(&sp, &c, ComplaintStatus::Resolved, Some("Replaced the unit"))
            .unwrap();

        assert!(action.audit.is_resolution);
        assert_eq!(action.audit.note, "Replaced the unit");
        assert!(action.resolved_at.is_some());
        assert!(action.closed_at.is_none());
    }

    #[test]
    fn test_resolved_timestamp_set_only_once() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let sp = support(tenant);
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::InProgress);
        c.assigned_to = Some(sp.user_id);
        c.resolved_at = Some(Utc::now());

        let action = engine
            .update_status(&sp, &c, ComplaintStatus::Resolved, None)
            .unwrap();
        assert!(action.resolved_at.is_none());
    }

    #[test]
    fn test_permissive_allows_resetting_current_status() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Resolved);

        let action = engine
            .update_status(&actor, &c, ComplaintStatus::Resolved, None)
            .unwrap();
        assert_eq!(action.new_status, ComplaintStatus::Resolved);
    }

    #[test]
    fn test_permissive_reopens_closed_complaint() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Closed);

        let action = engine
            .update_status(&actor, &c, ComplaintStatus::InProgress, None)
            .unwrap();
        assert_eq!(action.new_status, ComplaintStatus::InProgress);

        let strict = LifecycleEngine::new(TransitionPolicy::Strict);
        let err = strict
            .update_status(&actor, &c, ComplaintStatus::InProgress, None)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[rstest]
    #[case(ComplaintStatus::Logged, ComplaintStatus::Assigned, true, true)]
    #[case(ComplaintStatus::Assigned, ComplaintStatus::InProgress, true, true)]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Resolved, true, true)]
    #[case(ComplaintStatus::Resolved, ComplaintStatus::Closed, true, true)]
    #[case(ComplaintStatus::Logged, ComplaintStatus::Resolved, true, true)]
    #[case(ComplaintStatus::Resolved, ComplaintStatus::InProgress, true, false)]
    #[case(ComplaintStatus::Assigned, ComplaintStatus::Logged, true, false)]
    #[case(ComplaintStatus::Logged, ComplaintStatus::Logged, true, false)]
    #[case(ComplaintStatus::Closed, ComplaintStatus::Logged, true, false)]
    #[case(ComplaintStatus::Closed, ComplaintStatus::Resolved, true, false)]
    fn test_transition_policy_table(
        #[case] from: ComplaintStatus,
        #[case] to: ComplaintStatus,
        #[case] permissive: bool,
        #[case] strict: bool,
    ) {
        assert_eq!(TransitionPolicy::Permissive.allows(from, to), permissive);
        assert_eq!(TransitionPolicy::Strict.allows(from, to), strict);
    }

    #[test]
    fn test_strict_policy_rejects_backward_moves() {
        let engine = LifecycleEngine::new(TransitionPolicy::Strict);
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Resolved);

        let err = engine
            .update_status(&actor, &c, ComplaintStatus::InProgress, None)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

        // Permissive allows reopening.
        let permissive = LifecycleEngine::default();
        assert!(
            permissive
                .update_status(&actor, &c, ComplaintStatus::InProgress, None)
                .is_ok()
        );
    }

    #[test]
    fn test_add_note_carries_no_status_change() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::InProgress);

        let action = engine
            .add_note(&actor, &c, "Waiting on parts from the vendor")
            .unwrap();
        assert_eq!(action.audit.status_changed_to, None);
        assert!(!action.audit.is_resolution);
    }

    #[test]
    fn test_support_notes_colleague_assigned_complaint() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let sp = support(tenant);
        let mut c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::InProgress);
        c.assigned_to = Some(Uuid::new_v4());

        assert!(engine.add_note(&sp, &c, "Vendor confirmed the fault").is_ok());

        // A support person from another tenant is still rejected.
        let outsider = support(Uuid::new_v4());
        let err = engine.add_note(&outsider, &c, "nope").unwrap_err();
        assert!(matches!(err, LifecycleError::AccessDenied(_)));
    }

    #[test]
    fn test_consumers_cannot_add_notes() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::Logged);

        let err = engine.add_note(&owner, &c, "Any update?").unwrap_err();
        assert!(matches!(err, LifecycleError::RoleNotAllowed { .. }));
    }

    #[test]
    fn test_add_note_rejects_empty_note() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let actor = agent(tenant);
        let c = complaint(tenant, Uuid::new_v4(), ComplaintStatus::Logged);

        assert!(matches!(
            engine.add_note(&actor, &c, "   "),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn test_owner_confirms_resolution() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::Resolved);

        let action = engine
            .confirm_resolution(&owner, &c, Some("Works again, thanks"))
            .unwrap();

        assert_eq!(action.new_status, ComplaintStatus::Closed);
        assert_eq!(action.feedback.as_deref(), Some("Works again, thanks"));
        assert_eq!(action.audit.note, "Resolution confirmed by consumer");
    }

    #[test]
    fn test_non_owner_cannot_confirm() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let stranger = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::Resolved);

        let err = engine.confirm_resolution(&stranger, &c, None).unwrap_err();
        // A stranger's scope does not cover the complaint at all.
        assert!(matches!(err, LifecycleError::AccessDenied(_)));
    }

    #[test]
    fn test_confirm_requires_resolved_status() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::InProgress);

        let err = engine.confirm_resolution(&owner, &c, None).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidStatus {
                expected: ComplaintStatus::Resolved,
                ..
            }
        ));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_confirm_blank_feedback_is_dropped() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::Resolved);

        let action = engine.confirm_resolution(&owner, &c, Some("  ")).unwrap();
        assert!(action.feedback.is_none());
    }

    #[test]
    fn test_view_follows_visibility() {
        let engine = LifecycleEngine::default();
        let tenant = Uuid::new_v4();
        let owner = consumer(tenant);
        let other = consumer(tenant);
        let c = complaint(tenant, owner.user_id, ComplaintStatus::Logged);

        assert!(engine.view(&owner, Some(&c)).is_ok());
        assert!(matches!(
            engine.view(&other, Some(&c)),
            Err(LifecycleError::AccessDenied(_))
        ));
        assert!(matches!(
            engine.view(&owner, None),
            Err(LifecycleError::ComplaintNotFound(_))
        ));
    }
}
