//! Shared configuration, errors, and auth types for Finora.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (server, database, JWT, billing, plan)
//! - Application-wide error taxonomy
//! - Auth claims and the per-request `Identity`
//! - JWT validation for tokens issued by the auth provider
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Identity};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
