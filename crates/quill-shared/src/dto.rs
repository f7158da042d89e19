//! Data Transfer Objects - request/response types for the API.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{
    AuthorRef, Category, CategoryRef, Post, PostStatus, Tag, TagRef, WithPostCount,
};

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: String,
}

/// A category with the number of published posts filed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            post_count: None,
        }
    }
}

impl From<WithPostCount<Category>> for CategoryResponse {
    fn from(counted: WithPostCount<Category>) -> Self {
        Self {
            post_count: Some(counted.post_count),
            ..Self::from(counted.item)
        }
    }
}

/// Tag names to get-or-create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagsRequest {
    pub names: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            post_count: None,
        }
    }
}

impl From<WithPostCount<Tag>> for TagResponse {
    fn from(counted: WithPostCount<Tag>) -> Self {
        Self {
            post_count: Some(counted.post_count),
            ..Self::from(counted.item)
        }
    }
}

/// Body of both `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub category_id: Uuid,
    #[serde(default)]
    pub tag_ids: BTreeSet<Uuid>,
}

/// Query string of the public post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

/// `{id, name}` reference embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

impl From<AuthorRef> for NamedRef {
    fn from(r: AuthorRef) -> Self {
        Self { id: r.id, name: r.name }
    }
}

impl From<CategoryRef> for NamedRef {
    fn from(r: CategoryRef) -> Self {
        Self { id: r.id, name: r.name }
    }
}

impl From<TagRef> for NamedRef {
    fn from(r: TagRef) -> Self {
        Self { id: r.id, name: r.name }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: NamedRef,
    pub category: NamedRef,
    pub tags: Vec<NamedRef>,
    /// Estimated minutes to read.
    pub reading_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            reading_time: post.reading_time(),
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author.into(),
            category: post.category.into(),
            tags: post.tags.into_iter().map(NamedRef::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            status: post.status,
        }
    }
}
