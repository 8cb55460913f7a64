//! Tenant repository for database operations.
//!
//! Tenant deletion is a status flip to `inactive`: the row stays visible
//! to the admin and can be re-activated through an update.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use crate::entities::{
    sea_orm_active_enums::{TenantStatus, TenantType},
    tenants,
};

/// Tenant repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a tenant by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tenants::Model>, DbErr> {
        tenants::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a tenant with the given name already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn name_exists(&self, name: &str) -> Result<bool, DbErr> {
        let count = tenants::Entity::find()
            .filter(tenants::Column::Name.eq(name))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Lists all tenants, inactive ones included, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<tenants::Model>, DbErr> {
        all_tenants_query().all(&self.db).await
    }

    /// Lists the active tenants, ordered by name.
    ///
    /// This backs the public registration page, so inactive tenants are
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<tenants::Model>, DbErr> {
        active_tenants_query().all(&self.db).await
    }

    /// Creates a new tenant, active by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        name: &str,
        tenant_type: TenantType,
    ) -> Result<tenants::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let tenant = tenants::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            tenant_type: Set(tenant_type),
            status: Set(TenantStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        tenant.insert(&self.db).await
    }

    /// Updates a tenant's name, type, or status.
    ///
    /// Returns `None` if the tenant does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        tenant_type: Option<TenantType>,
        status: Option<TenantStatus>,
    ) -> Result<Option<tenants::Model>, DbErr> {
        let Some(tenant) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: tenants::ActiveModel = tenant.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(tenant_type) = tenant_type {
            active.tenant_type = Set(tenant_type);
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deactivates a tenant.
    ///
    /// The row stays in place and visible to the admin; its users can no
    /// longer log in, and an update can flip it back to active.
    ///
    /// Returns `false` if the tenant does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(tenant) = self.find_by_id(id).await? else {
            return Ok(false);
        };

        let mut active: tenants::ActiveModel = tenant.into();
        active.status = Set(TenantStatus::Inactive);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await?;

        Ok(true)
    }
}

/// Query for the admin tenant listing, newest first.
fn all_tenants_query() -> Select<tenants::Entity> {
    tenants::Entity::find().order_by_desc(tenants::Column::CreatedAt)
}

/// Query for the public active-tenant listing, name ascending.
fn active_tenants_query() -> Select<tenants::Entity> {
    tenants::Entity::find()
        .filter(tenants::Column::Status.eq(TenantStatus::Active))
        .order_by_asc(tenants::Column::Name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_admin_listing_keeps_inactive_tenants() {
        let sql = all_tenants_query().build(DbBackend::Postgres).to_string();
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains(r#"ORDER BY "tenants"."created_at" DESC"#));
    }

    #[test]
    fn test_active_listing_filters_status_and_sorts_by_name() {
        let sql = active_tenants_query()
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""tenants"."status""#));
        assert!(sql.contains(r#"ORDER BY "tenants"."name" ASC"#));
    }
}
