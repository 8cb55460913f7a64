//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Complaint lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "complaint_status")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[sea_orm(string_value = "logged")]
    Logged,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Complaint priority.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "complaint_priority")]
#[serde(rename_all = "lowercase")]
pub enum ComplaintPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

/// User role.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,
    #[sea_orm(string_value = "consumer")]
    #[serde(rename = "consumer")]
    Consumer,
    #[sea_orm(string_value = "ha")]
    #[serde(rename = "ha")]
    HelpdeskAgent,
    #[sea_orm(string_value = "sp")]
    #[serde(rename = "sp")]
    SupportPerson,
    #[sea_orm(string_value = "hm")]
    #[serde(rename = "hm")]
    HelpdeskManager,
}

/// Tenant industry type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tenant_type")]
#[serde(rename_all = "lowercase")]
pub enum TenantType {
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "telecom")]
    Telecom,
    #[sea_orm(string_value = "airline")]
    Airline,
}

/// Tenant activation status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tenant_status")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl TenantType {
    /// Parses a tenant type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bank" => Some(Self::Bank),
            "telecom" => Some(Self::Telecom),
            "airline" => Some(Self::Airline),
            _ => None,
        }
    }
}

impl TenantStatus {
    /// Parses a tenant status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}
