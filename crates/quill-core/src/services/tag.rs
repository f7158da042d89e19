use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Tag, WithPostCount};
use crate::error::DomainError;
use crate::ports::TagRepository;

/// Tag rules: get-or-create by name, no deleting tags still on posts.
#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    /// All tags with their published-post counts.
    pub async fn list_tags(&self) -> Result<Vec<WithPostCount<Tag>>, DomainError> {
        Ok(self.tags.find_all_with_post_count().await?)
    }

    pub async fn get_tag(&self, id: Uuid) -> Result<Tag, DomainError> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Tag", id))
    }

    /// Resolve every id to a tag, failing on the first unknown one.
    pub async fn get_tags_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Tag>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.tags.find_by_ids(ids).await?;
        if found.len() != ids.len() {
            let known: HashSet<Uuid> = found.iter().map(|t| t.id).collect();
            if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
                return Err(DomainError::not_found("Tag", *missing));
            }
        }

        Ok(found)
    }

    /// Get-or-create a tag for every name.
    ///
    /// Names that already exist are returned as stored; the rest are
    /// inserted in one batch. The result holds exactly one tag per name,
    /// new tags first.
    pub async fn create_tags(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, DomainError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.tags.find_by_names_in(names).await?;
        let known: HashSet<&str> = existing.iter().map(|t| t.name.as_str()).collect();

        let missing: Vec<Tag> = names
            .iter()
            .filter(|name| !known.contains(name.as_str()))
            .map(|name| Tag::new(name.clone()))
            .collect();

        let mut tags = if missing.is_empty() {
            Vec::new()
        } else {
            let created = self.tags.save_all(missing).await?;
            tracing::info!(count = created.len(), "Tags created");
            created
        };

        tags.extend(existing);
        Ok(tags)
    }

    pub async fn delete_tag(&self, id: Uuid) -> Result<(), DomainError> {
        let tag = self.get_tag(id).await?;

        if self.tags.count_posts(tag.id).await? > 0 {
            return Err(DomainError::Conflict(format!(
                "Tag '{}' is used by posts and cannot be deleted",
                tag.name
            )));
        }

        self.tags.delete(id).await?;
        tracing::info!(tag_id = %id, "Tag deleted");
        Ok(())
    }
}
