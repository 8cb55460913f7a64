//! Core business logic for Redress.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, authorization rules, and state-transition logic live here.
//!
//! # Modules
//!
//! - `lifecycle` - Complaint state machine, capability table, and visibility rules
//! - `auth` - Password hashing

pub mod auth;
pub mod lifecycle;
