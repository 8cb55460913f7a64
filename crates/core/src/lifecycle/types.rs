//! Lifecycle domain types.
//!
//! This module defines the complaint status and priority enums, the user
//! roles, and the snapshot types the engine judges transitions against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Complaint status in the resolution lifecycle.
///
/// Complaints progress through these states from filing to closure:
/// `logged → assigned → in_progress → resolved → closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Complaint has been filed by a consumer.
    Logged,
    /// Complaint has been assigned to a support person.
    Assigned,
    /// A support person is working on the complaint.
    InProgress,
    /// The complaint has been resolved, awaiting consumer confirmation.
    Resolved,
    /// The complaint is closed.
    Closed,
}

impl ComplaintStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logged => "logged",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "logged" => Some(Self::Logged),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns the position of the status in the forward lifecycle order.
    #[must_use]
    pub const fn position(&self) -> u8 {
        match self {
            Self::Logged => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
            Self::Closed => 4,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complaint priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (the default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a priority from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User role.
///
/// `admin` is the global operator and carries no tenant; every other role
/// belongs to exactly one tenant, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Global operator managing tenants and staff across all tenants.
    #[serde(rename = "admin")]
    Admin,
    /// End customer who files complaints against their tenant.
    #[serde(rename = "consumer")]
    Consumer,
    /// Helpdesk agent: tenant staff who assigns complaints.
    #[serde(rename = "ha")]
    HelpdeskAgent,
    /// Support person: tenant staff who works assigned complaints.
    #[serde(rename = "sp")]
    SupportPerson,
    /// Helpdesk manager: agent-equivalent privileges plus oversight views.
    #[serde(rename = "hm")]
    HelpdeskManager,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Consumer => "consumer",
            Self::HelpdeskAgent => "ha",
            Self::SupportPerson => "sp",
            Self::HelpdeskManager => "hm",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "consumer" => Some(Self::Consumer),
            "ha" => Some(Self::HelpdeskAgent),
            "sp" => Some(Self::SupportPerson),
            "hm" => Some(Self::HelpdeskManager),
            _ => None,
        }
    }

    /// Returns true for roles that may be created through the staff path.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Self::HelpdeskAgent | Self::SupportPerson | Self::HelpdeskManager
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated identity an operation runs as.
///
/// Produced by the authentication gate; the engine never re-verifies
/// credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The acting user.
    pub user_id: Uuid,
    /// The actor's role.
    pub role: Role,
    /// The actor's tenant; `None` only for the global admin.
    pub tenant_id: Option<Uuid>,
}

/// Snapshot of the complaint fields the engine judges transitions against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplaintState {
    /// Complaint identifier.
    pub id: Uuid,
    /// Owning tenant (immutable).
    pub tenant_id: Uuid,
    /// Filing consumer (immutable).
    pub consumer_id: Uuid,
    /// Assigned support person, if any.
    pub assigned_to: Option<Uuid>,
    /// Current status.
    pub status: ComplaintStatus,
    /// When the complaint first entered `resolved`, if ever.
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the complaint first entered `closed`, if ever.
    pub closed_at: Option<DateTime<Utc>>,
}

/// The candidate assignee for an assignment operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    /// The candidate user.
    pub id: Uuid,
    /// The candidate's role; must be [`Role::SupportPerson`].
    pub role: Role,
    /// The candidate's tenant; must match the complaint's tenant.
    pub tenant_id: Option<Uuid>,
    /// Display name recorded in the assignment audit note.
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ComplaintStatus::Logged.as_str(), "logged");
        assert_eq!(ComplaintStatus::Assigned.as_str(), "assigned");
        assert_eq!(ComplaintStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ComplaintStatus::Resolved.as_str(), "resolved");
        assert_eq!(ComplaintStatus::Closed.as_str(), "closed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            ComplaintStatus::parse("logged"),
            Some(ComplaintStatus::Logged)
        );
        assert_eq!(
            ComplaintStatus::parse("IN_PROGRESS"),
            Some(ComplaintStatus::InProgress)
        );
        assert_eq!(
            ComplaintStatus::parse("Closed"),
            Some(ComplaintStatus::Closed)
        );
        assert_eq!(ComplaintStatus::parse("invalid"), None);
    }

    #[test]
    fn test_status_forward_order() {
        assert!(ComplaintStatus::Logged.position() < ComplaintStatus::Assigned.position());
        assert!(ComplaintStatus::Assigned.position() < ComplaintStatus::InProgress.position());
        assert!(ComplaintStatus::InProgress.position() < ComplaintStatus::Resolved.position());
        assert!(ComplaintStatus::Resolved.position() < ComplaintStatus::Closed.position());
    }

    #[test]
    fn test_priority_parse_and_default() {
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("consumer"), Some(Role::Consumer));
        assert_eq!(Role::parse("ha"), Some(Role::HelpdeskAgent));
        assert_eq!(Role::parse("sp"), Some(Role::SupportPerson));
        assert_eq!(Role::parse("hm"), Some(Role::HelpdeskManager));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::HelpdeskAgent.is_staff());
        assert!(Role::SupportPerson.is_staff());
        assert!(Role::HelpdeskManager.is_staff());
        assert!(!Role::Admin.is_staff());
        assert!(!Role::Consumer.is_staff());
    }
}
