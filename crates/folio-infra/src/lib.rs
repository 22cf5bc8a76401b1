//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`:
//! repositories, file stores, the background job queue and session tokens.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT session tokens

pub mod database;
pub mod jobs;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use jobs::{InMemoryJobQueue, InMemoryJobQueueConfig};
pub use storage::{InMemoryFileStore, LocalFileStore};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository};
