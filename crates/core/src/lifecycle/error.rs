//! Lifecycle engine errors.

use thiserror::Error;
use uuid::Uuid;

use super::types::ComplaintStatus;

/// Errors produced by lifecycle validation.
///
/// Each variant maps to a stable HTTP status code and machine-readable
/// error code so callers can translate failures uniformly.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The complaint does not exist or is outside the actor's visibility.
    #[error("complaint not found: {0}")]
    ComplaintNotFound(Uuid),

    /// The actor's role may not perform this operation.
    #[error("role '{role}' is not allowed to {operation}")]
    RoleNotAllowed {
        /// The actor's role.
        role: String,
        /// The denied operation.
        operation: String,
    },

    /// The actor may perform the operation in general but not on this
    /// particular complaint (wrong tenant, not the owner, not the assignee).
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The requested status change is not a valid transition.
    #[error("invalid transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: ComplaintStatus,
        /// Requested status.
        to: ComplaintStatus,
    },

    /// The operation requires a different current status.
    #[error("complaint is '{actual}', expected '{expected}'")]
    InvalidStatus {
        /// Status the operation requires.
        expected: ComplaintStatus,
        /// Status the complaint is in.
        actual: ComplaintStatus,
    },

    /// The assignment target is not a support person.
    #[error("assignee {0} is not a support person")]
    InvalidAssignee(Uuid),

    /// The assignment target belongs to a different tenant.
    #[error("assignee {0} belongs to a different tenant")]
    AssigneeTenantMismatch(Uuid),

    /// A request payload field failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl LifecycleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ComplaintNotFound(_) => 404,
            Self::RoleNotAllowed { .. } | Self::AccessDenied(_) => 403,
            Self::InvalidTransition { .. } | Self::Validation(_) => 400,
            Self::InvalidStatus { .. }
            | Self::InvalidAssignee(_)
            | Self::AssigneeTenantMismatch(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ComplaintNotFound(_) => "COMPLAINT_NOT_FOUND",
            Self::RoleNotAllowed { .. } => "ROLE_NOT_ALLOWED",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::InvalidAssignee(_) => "INVALID_ASSIGNEE",
            Self::AssigneeTenantMismatch(_) => "ASSIGNEE_TENANT_MISMATCH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            LifecycleError::ComplaintNotFound(Uuid::nil()).status_code(),
            404
        );
        assert_eq!(
            LifecycleError::RoleNotAllowed {
                role: "consumer".to_string(),
                operation: "assign".to_string(),
            }
            .status_code(),
            403
        );
        assert_eq!(
            LifecycleError::AccessDenied("not the owner".to_string()).status_code(),
            403
        );
        assert_eq!(
            LifecycleError::InvalidTransition {
                from: ComplaintStatus::Closed,
                to: ComplaintStatus::Logged,
            }
            .status_code(),
            400
        );
        assert_eq!(
            LifecycleError::InvalidStatus {
                expected: ComplaintStatus::Resolved,
                actual: ComplaintStatus::InProgress,
            }
            .status_code(),
            409
        );
        assert_eq!(
            LifecycleError::InvalidAssignee(Uuid::nil()).status_code(),
            409
        );
        assert_eq!(
            LifecycleError::AssigneeTenantMismatch(Uuid::nil()).status_code(),
            409
        );
        assert_eq!(
            LifecycleError::Validation("title is required".to_string()).status_code(),
            400
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            LifecycleError::ComplaintNotFound(Uuid::nil()).error_code(),
            "COMPLAINT_NOT_FOUND"
        );
        assert_eq!(
            LifecycleError::InvalidTransition {
                from: ComplaintStatus::Logged,
                to: ComplaintStatus::Closed,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(
            LifecycleError::AssigneeTenantMismatch(Uuid::nil()).error_code(),
            "ASSIGNEE_TENANT_MISMATCH"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LifecycleError::InvalidTransition {
            from: ComplaintStatus::Resolved,
            to: ComplaintStatus::Logged,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition from 'resolved' to 'logged'"
        );
    }
}
