//! # Quill Shared
//!
//! Wire types for the HTTP API. Field names are camelCase on the wire.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
