//! Complaint lifecycle engine.
//!
//! This module is the business core of the system: the complaint state
//! machine, the (operation, role) capability table, the tenant/role
//! visibility predicate, and the audit-entry emission that accompanies
//! every state change. The engine is stateless and database-free; callers
//! fetch the current complaint snapshot, ask the engine for a validated
//! action, and apply it atomically.

pub mod engine;
pub mod error;
pub mod policy;
pub mod types;

pub use engine::{
    AssignAction, AuditEntry, ConfirmAction, CreateAction, LifecycleEngine, NoteAction,
    StatusAction, TransitionPolicy,
};
pub use error::LifecycleError;
pub use policy::{Operation, VisibilityScope, authorize, is_allowed};
pub use types::{Actor, Assignee, ComplaintState, ComplaintStatus, Priority, Role};
