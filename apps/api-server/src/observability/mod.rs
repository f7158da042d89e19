//! Observability and cross-cutting HTTP middleware.

mod cors;
mod request_id;

pub use cors::Cors;
pub use request_id::{RequestId, RequestIdMiddleware};
