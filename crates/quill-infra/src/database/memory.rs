//! In-memory store - used when `DATABASE_URL` is not set.
//!
//! One set of tables backs every repository so that post counts and
//! deletion guards see the same data the post repository writes.
//! Note: Data is lost on process restart.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Post, PostStatus, Tag, Timestamped, User, WithPostCount};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, PostRepository, TagRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    posts: Vec<Post>,
}

/// Insertion-ordered tables behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn published(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        self.tables
            .read()
            .await
            .posts
            .iter()
            .filter(|p| p.is_published() && keep(*p))
            .cloned()
            .collect()
    }
}

/// Write `entity` into `rows`, stamping timestamps the way the database
/// store does: keep the stored `created_at`, refresh `updated_at`.
fn upsert<T: Timestamped + Clone>(rows: &mut Vec<T>, mut entity: T) -> T {
    let now = Utc::now();
    if let Some(stored) = rows.iter_mut().find(|row| row.id() == entity.id()) {
        entity.stamp(stored.created_at(), now);
        *stored = entity.clone();
    } else {
        entity.stamp(now, now);
        rows.push(entity.clone());
    }
    entity
}

fn remove<T: Timestamped>(rows: &mut Vec<T>, id: Uuid) -> Result<(), RepoError> {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    if rows.len() == before {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

fn find<T: Timestamped + Clone>(rows: &[T], id: Uuid) -> Option<T> {
    rows.iter().find(|row| row.id() == id).cloned()
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(find(&self.tables.read().await.users, id))
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }
        Ok(upsert(&mut tables.users, user))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&mut self.tables.write().await.users, id)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(find(&self.tables.read().await.categories, id))
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        if tables
            .categories
            .iter()
            .any(|c| c.id != category.id && c.same_name(&category.name))
        {
            return Err(RepoError::Constraint(format!(
                "Category already exists: {}",
                category.name
            )));
        }
        let saved = upsert(&mut tables.categories, category);
        // Posts carry a copy of the category name; keep it in step with renames.
        for post in tables.posts.iter_mut().filter(|p| p.category.id == saved.id) {
            post.category.name.clone_from(&saved.name);
        }
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.category.id == id) {
            return Err(RepoError::Constraint("Category has posts".to_string()));
        }
        remove(&mut tables.categories, id)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().any(|c| c.same_name(name)))
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Category>>, RepoError> {
        let tables = self.tables.read().await;
        let listed = tables
            .categories
            .iter()
            .map(|category| {
                let published = tables
                    .posts
                    .iter()
                    .filter(|p| p.is_published() && p.category.id == category.id)
                    .count() as u64;
                WithPostCount::new(category.clone(), published)
            })
            .collect();
        Ok(listed)
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.category.id == id).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(find(&self.tables.read().await.tags, id))
    }

    async fn save(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.tags.iter().any(|t| t.id != tag.id && t.name == tag.name) {
            return Err(RepoError::Constraint(format!(
                "Tag already exists: {}",
                tag.name
            )));
        }
        Ok(upsert(&mut tables.tags, tag))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.has_tag(id)) {
            return Err(RepoError::Constraint("Tag is used by posts".to_string()));
        }
        remove(&mut tables.tags, id)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_names_in(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn save_all(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, RepoError> {
        let mut tables = self.tables.write().await;

        // Check the whole batch before writing any of it.
        let mut incoming = BTreeSet::new();
        for tag in &tags {
            let clash = tables.tags.iter().any(|t| t.name == tag.name);
            if clash || !incoming.insert(tag.name.as_str()) {
                return Err(RepoError::Constraint(format!(
                    "Tag already exists: {}",
                    tag.name
                )));
            }
        }

        Ok(tags
            .into_iter()
            .map(|tag| upsert(&mut tables.tags, tag))
            .collect())
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Tag>>, RepoError> {
        let tables = self.tables.read().await;
        let listed = tables
            .tags
            .iter()
            .map(|tag| {
                let published = tables
                    .posts
                    .iter()
                    .filter(|p| p.is_published() && p.has_tag(tag.id))
                    .count() as u64;
                WithPostCount::new(tag.clone(), published)
            })
            .collect();
        Ok(listed)
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.has_tag(id)).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(find(&self.tables.read().await.posts, id))
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.iter().any(|c| c.id == post.category.id) {
            return Err(RepoError::Constraint("Unknown category".to_string()));
        }
        if post
            .tag_ids()
            .any(|tag_id| !tables.tags.iter().any(|t| t.id == tag_id))
        {
            return Err(RepoError::Constraint("Unknown tag".to_string()));
        }
        Ok(upsert(&mut tables.posts, post))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&mut self.tables.write().await.posts, id)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_published_by_category_and_tag(
        &self,
        category_id: Uuid,
        tag_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .published(|p| p.category.id == category_id && p.has_tag(tag_id))
            .await)
    }

    async fn find_published_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self.published(|p| p.category.id == category_id).await)
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self.published(|p| p.has_tag(tag_id)).await)
    }

    async fn find_all_published(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.published(|_| true).await)
    }

    async fn find_by_author_and_status(
        &self,
        author_id: Uuid,
        status: PostStatus,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.author.id == author_id && p.status == status)
            .cloned()
            .collect())
    }
}
