//! # Folio Core
//!
//! The domain layer of the Folio blog backend.
//! This crate contains the post workflow and the ports it talks through,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::PostService;
