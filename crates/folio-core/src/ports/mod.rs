//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod file_store;
mod job_queue;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use file_store::FileStore;
pub use job_queue::{Job, JobHandler, JobQueue, JobQueueError, JobResult, QueueStats};
pub use repository::{BaseRepository, CategoryRepository, PostRepository, UserRepository};
