//! Database seeder for Redress development and testing.
//!
//! Seeds the global admin account (the only way an admin is created), a
//! demo tenant, and one staff account per role for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use redress_core::auth::hash_password;
use redress_db::entities::{
    sea_orm_active_enums::{TenantStatus, TenantType, UserRole},
    tenants, users,
};

/// Demo tenant ID (consistent for all seeds)
const DEMO_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = redress_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding admin account...");
    seed_admin(&db).await;

    println!("Seeding demo tenant...");
    seed_demo_tenant(&db).await;

    println!("Seeding demo staff...");
    seed_demo_staff(&db).await;

    println!("Seeding complete!");
}

fn demo_tenant_id() -> Uuid {
    Uuid::parse_str(DEMO_TENANT_ID).unwrap()
}

/// Seeds the global admin account from environment variables.
async fn seed_admin(db: &DatabaseConnection) {
    let email =
        std::env::var("REDRESS_ADMIN_EMAIL").unwrap_or_else(|_| "admin@redress.dev".to_string());
    let password =
        std::env::var("REDRESS_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-password".to_string());

    if users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Admin account already exists, skipping...");
        return;
    }

    let password_hash = hash_password(&password).expect("Failed to hash admin password");

    let now = Utc::now().into();
    let admin = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(None),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        first_name: Set("System".to_string()),
        last_name: Set("Admin".to_string()),
        role: Set(UserRole::Admin),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = admin.insert(db).await {
        eprintln!("Failed to insert admin account: {e}");
    } else {
        println!("  Created admin account: {email}");
    }
}

/// Seeds a demo tenant for development.
async fn seed_demo_tenant(db: &DatabaseConnection) {
    if tenants::Entity::find_by_id(demo_tenant_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo tenant already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let tenant = tenants::ActiveModel {
        id: Set(demo_tenant_id()),
        name: Set("Acme Bank".to_string()),
        tenant_type: Set(TenantType::Bank),
        status: Set(TenantStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = tenant.insert(db).await {
        eprintln!("Failed to insert demo tenant: {e}");
    } else {
        println!("  Created demo tenant: Acme Bank");
    }
}

/// Seeds one staff account per role in the demo tenant.
async fn seed_demo_staff(db: &DatabaseConnection) {
    let staff = [
        ("agent@redress.dev", "Helpdesk", "Agent", UserRole::HelpdeskAgent),
        ("support@redress.dev", "Support", "Person", UserRole::SupportPerson),
        ("manager@redress.dev", "Helpdesk", "Manager", UserRole::HelpdeskManager),
    ];

    for (email, first_name, last_name, role) in staff {
        if users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  {email} already exists, skipping...");
            continue;
        }

        let password_hash =
            hash_password("staff-password").expect("Failed to hash staff password");

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(Some(demo_tenant_id())),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert {email}: {e}");
        } else {
            println!("  Created staff account: {email}");
        }
    }
}
