//! Initial database migration.
//!
//! Creates the enums, core tables, and indexes for tenants, users,
//! complaints, and the complaint audit trail.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(COMPLAINTS_SQL).await?;
        db.execute_unprepared(COMPLAINT_UPDATES_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Tenant industry type
CREATE TYPE tenant_type AS ENUM ('bank', 'telecom', 'airline');

-- Tenant activation status
CREATE TYPE tenant_status AS ENUM ('active', 'inactive');

-- User roles
CREATE TYPE user_role AS ENUM (
    'admin',
    'consumer',
    'ha',
    'sp',
    'hm'
);

-- Complaint lifecycle status
CREATE TYPE complaint_status AS ENUM (
    'logged',
    'assigned',
    'in_progress',
    'resolved',
    'closed'
);

-- Complaint priority
CREATE TYPE complaint_priority AS ENUM ('low', 'medium', 'high');
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    type tenant_type NOT NULL,
    status tenant_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID REFERENCES tenants(id),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    role user_role NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- Only the global admin carries no tenant
    CONSTRAINT chk_tenant_presence CHECK (
        (role = 'admin' AND tenant_id IS NULL)
        OR (role <> 'admin' AND tenant_id IS NOT NULL)
    )
);
";

const COMPLAINTS_SQL: &str = r"
CREATE TABLE complaints (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    consumer_id UUID NOT NULL REFERENCES users(id),
    assigned_to UUID REFERENCES users(id),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    category VARCHAR(100),
    priority complaint_priority NOT NULL DEFAULT 'medium',
    status complaint_status NOT NULL DEFAULT 'logged',
    resolved_at TIMESTAMPTZ,
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const COMPLAINT_UPDATES_SQL: &str = r"
CREATE TABLE complaint_updates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    complaint_id UUID NOT NULL REFERENCES complaints(id) ON DELETE CASCADE,
    status_changed_to complaint_status,
    note TEXT NOT NULL,
    is_resolution BOOLEAN NOT NULL DEFAULT FALSE,
    consumer_confirmed BOOLEAN,
    consumer_feedback TEXT,
    updated_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_users_tenant ON users(tenant_id);
CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_complaints_tenant ON complaints(tenant_id);
CREATE INDEX idx_complaints_consumer ON complaints(consumer_id);
CREATE INDEX idx_complaints_assigned ON complaints(assigned_to);
CREATE INDEX idx_complaints_status ON complaints(status);
CREATE INDEX idx_complaint_updates_complaint ON complaint_updates(complaint_id, created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS complaint_updates CASCADE;
DROP TABLE IF EXISTS complaints CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS tenants CASCADE;

DROP TYPE IF EXISTS complaint_priority;
DROP TYPE IF EXISTS complaint_status;
DROP TYPE IF EXISTS user_role;
DROP TYPE IF EXISTS tenant_status;
DROP TYPE IF EXISTS tenant_type;
";
