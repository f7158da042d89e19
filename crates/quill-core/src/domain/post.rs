use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Tag, Timestamped, User, estimate_reading_time};

/// Post visibility. Only published posts show up in public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PostStatus::Draft),
            "PUBLISHED" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// The author of a post, as seen from the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// The category of a post, as seen from the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// A tag attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

/// Post entity - represents a blog post.
///
/// `reading_time` is derived from `content` whenever the body is written and
/// cannot be set directly. The wire form is `PostResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    reading_time: u32,
    pub author: AuthorRef,
    pub category: CategoryRef,
    pub tags: Vec<TagRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(
        author: AuthorRef,
        category: CategoryRef,
        tags: Vec<TagRef>,
        title: String,
        content: String,
        status: PostStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reading_time: estimate_reading_time(&content),
            title,
            content,
            status,
            author,
            category,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a post from stored columns. Reading time is taken as stored.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        title: String,
        content: String,
        status: PostStatus,
        reading_time: u32,
        author: AuthorRef,
        category: CategoryRef,
        tags: Vec<TagRef>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            content,
            status,
            reading_time,
            author,
            category,
            tags,
            created_at,
            updated_at,
        }
    }

    pub fn reading_time(&self) -> u32 {
        self.reading_time
    }

    /// Replace the body and recompute the reading time.
    pub fn set_content(&mut self, content: String) {
        self.reading_time = estimate_reading_time(&content);
        self.content = content;
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    pub fn tag_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.tags.iter().map(|t| t.id)
    }
}

impl Timestamped for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn stamp(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        let author = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        let category = Category::new("Rust".into());
        let tag = Tag::new("async".into());
        Post::new(
            AuthorRef::from(&author),
            CategoryRef::from(&category),
            vec![TagRef::from(&tag)],
            "Hello".into(),
            "one two three".into(),
            PostStatus::Draft,
        )
    }

    #[test]
    fn test_new_post_derives_reading_time() {
        let post = sample();
        assert_eq!(post.reading_time(), 1);
        assert!(!post.is_published());
    }

    #[test]
    fn test_set_content_recomputes_reading_time() {
        let mut post = sample();
        post.set_content(vec!["w"; 401].join(" "));
        assert_eq!(post.reading_time(), 3);

        post.set_content("   ".into());
        assert_eq!(post.reading_time(), 0);
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        assert_eq!("PUBLISHED".parse::<PostStatus>(), Ok(PostStatus::Published));
        assert_eq!(PostStatus::Draft.to_string(), "DRAFT");
        assert!("published".parse::<PostStatus>().is_err());
    }
}
