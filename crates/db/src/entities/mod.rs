//! `SeaORM` entity definitions.

pub mod complaint_updates;
pub mod complaints;
pub mod sea_orm_active_enums;
pub mod tenants;
pub mod users;
