use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AuthorRef, CategoryRef, Post, PostStatus, TagRef, User};
use crate::error::DomainError;
use crate::ports::PostRepository;

use super::{CategoryService, TagService};

/// Optional narrowing of the public post listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

/// Author-supplied fields of a post. Reading time is never part of it.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub category_id: Uuid,
    pub tag_ids: BTreeSet<Uuid>,
}

/// Post rules: published-only listing, reference resolution, authorship.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: CategoryService,
    tags: TagService,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: CategoryService,
        tags: TagService,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
        }
    }

    /// Published posts, optionally narrowed to a category, a tag, or both.
    ///
    /// Referenced ids must exist; the category is resolved before the tag,
    /// so with two bad ids the category is reported.
    pub async fn list_published(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError> {
        let posts = match (filter.category_id, filter.tag_id) {
            (Some(category_id), Some(tag_id)) => {
                let category = self.categories.get_category(category_id).await?;
                let tag = self.tags.get_tag(tag_id).await?;
                self.posts
                    .find_published_by_category_and_tag(category.id, tag.id)
                    .await?
            }
            (Some(category_id), None) => {
                let category = self.categories.get_category(category_id).await?;
                self.posts.find_published_by_category(category.id).await?
            }
            (None, Some(tag_id)) => {
                let tag = self.tags.get_tag(tag_id).await?;
                self.posts.find_published_by_tag(tag.id).await?
            }
            (None, None) => self.posts.find_all_published().await?,
        };

        tracing::debug!(
            category_id = ?filter.category_id,
            tag_id = ?filter.tag_id,
            count = posts.len(),
            "Listed published posts"
        );
        Ok(posts)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    /// The author's unpublished posts.
    pub async fn list_drafts(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .posts
            .find_by_author_and_status(author_id, PostStatus::Draft)
            .await?)
    }

    pub async fn create_post(&self, author: &User, draft: PostDraft) -> Result<Post, DomainError> {
        let (category, tags) = self.resolve_references(&draft).await?;

        let post = Post::new(
            AuthorRef::from(author),
            category,
            tags,
            draft.title,
            draft.content,
            draft.status,
        );

        let saved = self.posts.save(post).await?;
        tracing::info!(
            post_id = %saved.id,
            author_id = %saved.author.id,
            status = %saved.status,
            "Post created"
        );
        Ok(saved)
    }

    /// Replace a post's fields. Only its author may do this.
    pub async fn update_post(
        &self,
        id: Uuid,
        editor_id: Uuid,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        let mut post = self.get_post(id).await?;
        if post.author.id != editor_id {
            return Err(DomainError::Forbidden);
        }

        let (category, tags) = self.resolve_references(&draft).await?;

        post.title = draft.title;
        post.set_content(draft.content);
        post.status = draft.status;
        post.category = category;
        post.tags = tags;

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, status = %saved.status, "Post updated");
        Ok(saved)
    }

    pub async fn delete_post(&self, id: Uuid, editor_id: Uuid) -> Result<(), DomainError> {
        let post = self.get_post(id).await?;
        if post.author.id != editor_id {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn resolve_references(
        &self,
        draft: &PostDraft,
    ) -> Result<(CategoryRef, Vec<TagRef>), DomainError> {
        let category = self.categories.get_category(draft.category_id).await?;
        let tags = self.tags.get_tags_by_ids(&draft.tag_ids).await?;
        Ok((
            CategoryRef::from(&category),
            tags.iter().map(TagRef::from).collect(),
        ))
    }
}
