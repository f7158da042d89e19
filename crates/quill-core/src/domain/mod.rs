//! Domain entities - the core business objects.

mod category;
mod post;
mod reading_time;
mod tag;
mod user;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use category::Category;
pub use post::{AuthorRef, CategoryRef, Post, PostStatus, TagRef};
pub use reading_time::{WORDS_PER_MINUTE, estimate_reading_time};
pub use tag::Tag;
pub use user::User;

/// Entities whose timestamps are written by the store at save time.
pub trait Timestamped {
    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Overwrite both timestamps. Stores call this on every write, keeping
    /// `created_at` from the stored row when one exists.
    fn stamp(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);
}

/// An entity paired with the number of posts that reference it.
///
/// The count is computed by the store when the entity is read; it is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithPostCount<T> {
    pub item: T,
    pub post_count: u64,
}

impl<T> WithPostCount<T> {
    pub fn new(item: T, post_count: u64) -> Self {
        Self { item, post_count }
    }
}
