//! Services - the business rules sitting between handlers and ports.
//!
//! Each service is a cheap-to-clone handle over `Arc`ed ports.

mod category;
mod post;
mod tag;
mod user;

#[cfg(test)]
mod fakes;

pub use category::CategoryService;
pub use post::{PostDraft, PostFilter, PostService};
pub use tag::TagService;
pub use user::{SignUp, UserService};
