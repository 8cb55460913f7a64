//! Authentication types and API payload shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role (`admin`, `consumer`, `ha`, `sp`, `hm`).
    pub role: String,
    /// Tenant ID; absent for the global admin.
    pub tenant: Option<Uuid>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        role: &str,
        tenant_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            tenant: tenant_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the tenant ID from claims, if any.
    #[must_use]
    pub const fn tenant_id(&self) -> Option<Uuid> {
        self.tenant
    }
}

/// Consumer self-registration request (public).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterConsumerRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Tenant the consumer registers against.
    pub tenant_id: Uuid,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Staff creation request (admin only, roles ha/sp/hm).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Staff role: `ha`, `sp`, or `hm`.
    pub role: String,
    /// Tenant the staff member belongs to.
    pub tenant_id: Uuid,
}

/// Tenant creation request (admin only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenantRequest {
    /// Tenant name (unique).
    pub name: String,
    /// Tenant type: `bank`, `telecom`, or `airline`.
    #[serde(rename = "type")]
    pub tenant_type: String,
}

/// Tenant update request (admin only); all fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTenantRequest {
    /// New tenant name.
    pub name: Option<String>,
    /// New tenant type.
    #[serde(rename = "type")]
    pub tenant_type: Option<String>,
    /// New tenant status: `active` or `inactive`.
    pub status: Option<String>,
}

/// User profile update request (self or admin); all fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New email (must remain globally unique).
    pub email: Option<String>,
}

/// Complaint creation request (consumer only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComplaintRequest {
    /// Complaint title.
    pub title: String,
    /// Complaint description.
    pub description: String,
    /// Optional category label.
    pub category: Option<String>,
    /// Priority: `low`, `medium`, or `high` (defaults to medium).
    pub priority: Option<String>,
}

/// Complaint assignment request (ha/hm only).
#[derive(Debug, Clone, Deserialize)]
pub struct AssignComplaintRequest {
    /// Support person the complaint is assigned to.
    pub assigned_to: Uuid,
}

/// Complaint status update request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status value.
    pub status: String,
    /// Optional note; a default is generated when absent.
    pub note: Option<String>,
}

/// Complaint note request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddNoteRequest {
    /// Free-text note (non-empty).
    pub note: String,
}

/// Resolution confirmation request (owning consumer only).
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmResolutionRequest {
    /// Optional feedback recorded on the resolution entry.
    pub feedback: Option<String>,
}

/// Query filters for complaint listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintListQuery {
    /// Filter by status value.
    pub status: Option<String>,
    /// Filter by priority value.
    pub priority: Option<String>,
}

/// Query filters for user listings (admin only).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    /// Filter by role value.
    pub role: Option<String>,
    /// Filter by tenant.
    pub tenant_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_fields() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            "consumer",
            Some(tenant_id),
            Utc::now() + chrono::Duration::days(7),
        );

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.tenant_id(), Some(tenant_id));
        assert_eq!(claims.role, "consumer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_admin_claims_have_no_tenant() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "admin",
            None,
            Utc::now() + chrono::Duration::hours(1),
        );
        assert_eq!(claims.tenant_id(), None);
    }
}
