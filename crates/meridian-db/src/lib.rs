//! # meridian-db: Store Layer for the Meridian Order Engine
//!
//! This crate implements meridian-core's [`QueryGateway`] on SQLite,
//! using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian Data Flow                                 │
//! │                                                                         │
//! │  meridian-core (Validator, BatchRepricer, callouts)                    │
//! │       │                                                                 │
//! │       │ QueryGateway trait                                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    meridian-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SqliteGateway │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (gateway.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ QueryGateway  │    │ 001_init.sql │  │   │
//! │  │   │ WAL, FK on    │    │ impl          │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`gateway`] - The [`QueryGateway`] implementation
//! - [`error`] - Store error types and the LookupError mapping
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meridian_core::{Validator, ValidationEvent};
//! use meridian_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/meridian.db")).await?;
//! let gateway = db.gateway();
//!
//! let validator = Validator::new();
//! let verdict = validator.validate(event, &record, &gateway).await?;
//! ```
//!
//! [`QueryGateway`]: meridian_core::QueryGateway

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod migrations;
pub mod pool;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::StoreError;
pub use gateway::SqliteGateway;
pub use pool::{Database, DbConfig};
