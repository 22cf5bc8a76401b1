//! # Folio Shared
//!
//! Request and response types spoken by the HTTP API.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
