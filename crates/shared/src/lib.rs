//! Shared types, errors, and configuration for Redress.
//!
//! This crate provides common types used across all other crates:
//! - JWT claims and token service
//! - Request/response payload types for the API surface
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
