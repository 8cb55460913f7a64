//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod complaint;
pub mod tenant;
pub mod user;

pub use complaint::{
    ComplaintDetail, ComplaintRepository, priority_to_db, role_to_core, role_to_db,
    status_to_core, status_to_db,
};
pub use tenant::TenantRepository;
pub use user::UserRepository;
