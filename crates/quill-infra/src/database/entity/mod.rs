//! SeaORM entities for the blog schema.
//!
//! Tables: `users`, `categories`, `tags`, `posts` and the `post_tags` join.

pub mod category;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;
