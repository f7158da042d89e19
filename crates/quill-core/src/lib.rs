//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! Entities, ports and services live here; nothing in this crate knows about
//! HTTP or a concrete database.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
