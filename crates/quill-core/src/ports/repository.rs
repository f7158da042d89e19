use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, PostStatus, Tag, User, WithPostCount};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update). The store stamps `created_at`
    /// on first write and `updated_at` on every write.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// The `find_published_*` queries never return drafts. Results come back in
/// the store's insertion order.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_published_by_category_and_tag(
        &self,
        category_id: Uuid,
        tag_id: Uuid,
    ) -> Result<Vec<Post>, RepoError>;

    async fn find_published_by_category(&self, category_id: Uuid)
    -> Result<Vec<Post>, RepoError>;

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn find_all_published(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author_and_status(
        &self,
        author_id: Uuid,
        status: PostStatus,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Case-insensitive name lookup.
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, RepoError>;

    /// All categories, each with its number of published posts.
    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Category>>, RepoError>;

    /// Number of posts in the category, drafts included.
    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    /// Tags whose name is exactly one of `names`.
    async fn find_by_names_in(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, RepoError>;

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Tag>, RepoError>;

    /// Insert all tags in a single atomic write.
    async fn save_all(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, RepoError>;

    /// All tags, each with its number of published posts.
    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Tag>>, RepoError>;

    /// Number of posts carrying the tag, drafts included.
    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError>;
}
