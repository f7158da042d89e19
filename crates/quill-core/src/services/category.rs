use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, WithPostCount};
use crate::error::DomainError;
use crate::ports::CategoryRepository;

/// Category rules: case-insensitive unique names, no deleting categories
/// that still hold posts.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// All categories with their published-post counts.
    pub async fn list_categories(&self) -> Result<Vec<WithPostCount<Category>>, DomainError> {
        Ok(self.categories.find_all_with_post_count().await?)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub async fn create_category(&self, name: String) -> Result<Category, DomainError> {
        if self.categories.exists_by_name_ignore_case(&name).await? {
            return Err(DomainError::Conflict(format!(
                "Category already exists: {name}"
            )));
        }

        let saved = self.categories.save(Category::new(name)).await?;
        tracing::info!(category_id = %saved.id, name = %saved.name, "Category created");
        Ok(saved)
    }

    /// Rename a category. Changing only the case of its own name is allowed.
    pub async fn update_category(&self, id: Uuid, name: String) -> Result<Category, DomainError> {
        let mut category = self.get_category(id).await?;

        if !category.same_name(&name) && self.categories.exists_by_name_ignore_case(&name).await? {
            return Err(DomainError::Conflict(format!(
                "Category already exists: {name}"
            )));
        }

        category.name = name;
        let saved = self.categories.save(category).await?;
        tracing::info!(category_id = %saved.id, name = %saved.name, "Category renamed");
        Ok(saved)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), DomainError> {
        let category = self.get_category(id).await?;

        if self.categories.count_posts(category.id).await? > 0 {
            return Err(DomainError::Conflict(format!(
                "Category '{}' has posts and cannot be deleted",
                category.name
            )));
        }

        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;
    use crate::services::fakes::FakeStore;

    fn service(store: &Arc<FakeStore>) -> CategoryService {
        CategoryService::new(store.clone())
    }

    #[tokio::test]
    async fn test_create_category() {
        let store = FakeStore::new();
        let category = service(&store)
            .create_category("Test Category".into())
            .await
            .unwrap();

        assert_eq!(category.name, "Test Category");
        assert_eq!(store.category_writes(), 1);
        assert!(store.category(category.id).is_some());
    }

    #[tokio::test]
    async fn test_create_category_rejects_name_differing_only_in_case() {
        let store = FakeStore::new();
        let svc = service(&store);
        svc.create_category("News".into()).await.unwrap();

        let err = svc.create_category("news".into()).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.category_writes(), 1);
    }

    #[tokio::test]
    async fn test_update_category_allows_own_name_recase() {
        let store = FakeStore::new();
        let svc = service(&store);
        let news = svc.create_category("News".into()).await.unwrap();
        svc.create_category("Sport".into()).await.unwrap();

        let renamed = svc.update_category(news.id, "NEWS".into()).await.unwrap();
        assert_eq!(renamed.name, "NEWS");

        let err = svc.update_category(news.id, "sport".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_empty_category() {
        let store = FakeStore::new();
        let svc = service(&store);
        let category = svc.create_category("Empty".into()).await.unwrap();

        svc.delete_category(category.id).await.unwrap();

        let err = svc.get_category(category.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_category_with_draft_post_conflicts() {
        let store = FakeStore::new();
        let category = store.seed_category("Busy");
        store.seed_post(&category, &[], PostStatus::Draft);

        let err = service(&store)
            .delete_category(category.id)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(store.category(category.id).is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let store = FakeStore::new();
        let err = service(&store)
            .delete_category(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity_type: "Category",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_counts_only_published_posts() {
        let store = FakeStore::new();
        let category = store.seed_category("Mixed");
        store.seed_post(&category, &[], PostStatus::Published);
        store.seed_post(&category, &[], PostStatus::Draft);

        let listed = service(&store).list_categories().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].item.name, "Mixed");
        assert_eq!(listed[0].post_count, 1);
    }
}
