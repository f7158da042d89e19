//! In-process test doubles for the ports, with call bookkeeping.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AuthorRef, Category, CategoryRef, Post, PostStatus, Tag, TagRef, Timestamped, User,
    WithPostCount,
};
use crate::error::RepoError;
use crate::ports::{
    AuthError, BaseRepository, CategoryRepository, PasswordService, PostRepository, TagRepository,
    UserRepository,
};

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    users: Vec<User>,
    category_writes: usize,
    tag_calls: usize,
    tag_batches: Vec<usize>,
    last_post_query: Option<&'static str>,
}

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

fn upsert<T: Timestamped + Clone>(items: &mut Vec<T>, mut entity: T) -> T {
    let now = Utc::now();
    match items.iter_mut().find(|e| e.id() == entity.id()) {
        Some(stored) => {
            entity.stamp(stored.created_at(), now);
            *stored = entity.clone();
        }
        None => {
            entity.stamp(now, now);
            items.push(entity.clone());
        }
    }
    entity
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let category = Category::new(name.to_string());
        self.lock().categories.push(category.clone());
        category
    }

    pub fn seed_tag(&self, name: &str) -> Tag {
        let tag = Tag::new(name.to_string());
        self.lock().tags.push(tag.clone());
        tag
    }

    pub fn seed_user(&self, name: &str) -> User {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "hash".to_string(),
        );
        self.lock().users.push(user.clone());
        user
    }

    pub fn seed_post(&self, category: &Category, tags: &[&Tag], status: PostStatus) -> Post {
        let author = AuthorRef {
            id: Uuid::new_v4(),
            name: "seed".to_string(),
        };
        let post = Post::new(
            author,
            CategoryRef::from(category),
            tags.iter().map(|t| TagRef::from(*t)).collect(),
            "seeded".to_string(),
            "seeded body".to_string(),
            status,
        );
        self.lock().posts.push(post.clone());
        post
    }

    pub fn category(&self, id: Uuid) -> Option<Category> {
        self.lock().categories.iter().find(|c| c.id == id).cloned()
    }

    pub fn tag(&self, id: Uuid) -> Option<Tag> {
        self.lock().tags.iter().find(|t| t.id == id).cloned()
    }

    pub fn category_writes(&self) -> usize {
        self.lock().category_writes
    }

    pub fn tag_calls(&self) -> usize {
        self.lock().tag_calls
    }

    pub fn tag_batches(&self) -> Vec<usize> {
        self.lock().tag_batches.clone()
    }

    pub fn last_post_query(&self) -> Option<&'static str> {
        self.lock().last_post_query
    }

    fn published_where(&self, query: &'static str, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut state = self.lock();
        state.last_post_query = Some(query);
        state
            .posts
            .iter()
            .filter(|p| p.is_published() && keep(*p))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        Ok(upsert(&mut self.lock().posts, post))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for FakeStore {
    async fn find_published_by_category_and_tag(
        &self,
        category_id: Uuid,
        tag_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self.published_where("category_and_tag", |p| {
            p.category.id == category_id && p.has_tag(tag_id)
        }))
    }

    async fn find_published_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self.published_where("category", |p| p.category.id == category_id))
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self.published_where("tag", |p| p.has_tag(tag_id)))
    }

    async fn find_all_published(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.published_where("all", |_| true))
    }

    async fn find_by_author_and_status(
        &self,
        author_id: Uuid,
        status: PostStatus,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .lock()
            .posts
            .iter()
            .filter(|p| p.author.id == author_id && p.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.category(id))
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut state = self.lock();
        state.category_writes += 1;
        Ok(upsert(&mut state.categories, category))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.lock().categories.retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for FakeStore {
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, RepoError> {
        Ok(self.lock().categories.iter().any(|c| c.same_name(name)))
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Category>>, RepoError> {
        let state = self.lock();
        Ok(state
            .categories
            .iter()
            .map(|c| {
                let count = state
                    .posts
                    .iter()
                    .filter(|p| p.is_published() && p.category.id == c.id)
                    .count();
                WithPostCount::new(c.clone(), count as u64)
            })
            .collect())
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .lock()
            .posts
            .iter()
            .filter(|p| p.category.id == id)
            .count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        self.lock().tag_calls += 1;
        Ok(self.tag(id))
    }

    async fn save(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        Ok(upsert(&mut state.tags, tag))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        state.tags.retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for FakeStore {
    async fn find_by_names_in(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        Ok(state
            .tags
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Tag>, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        Ok(state
            .tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn save_all(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        state.tag_batches.push(tags.len());
        Ok(tags
            .into_iter()
            .map(|tag| upsert(&mut state.tags, tag))
            .collect())
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Tag>>, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        Ok(state
            .tags
            .iter()
            .map(|t| {
                let count = state
                    .posts
                    .iter()
                    .filter(|p| p.is_published() && p.has_tag(t.id))
                    .count();
                WithPostCount::new(t.clone(), count as u64)
            })
            .collect())
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        let mut state = self.lock();
        state.tag_calls += 1;
        Ok(state.posts.iter().filter(|p| p.has_tag(id)).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for FakeStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        Ok(upsert(&mut self.lock().users, user))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.lock().users.retain(|u| u.id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }
}

/// Reversible "hash" so tests stay fast.
pub struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}
