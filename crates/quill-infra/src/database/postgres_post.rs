//! PostgreSQL post repository.
//!
//! A post row only holds foreign keys; reads hydrate the author, category
//! and tag references with one batched query per table.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Set, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{AuthorRef, CategoryRef, Post, PostStatus, TagRef, Timestamped};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{query_error, write_error};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Published posts in insertion order.
    fn published() -> Select<PostEntity> {
        PostEntity::find()
            .filter(post::Column::Status.eq(post::Status::Published))
            .order_by_asc(post::Column::CreatedAt)
    }

    async fn fetch(&self, query: Select<PostEntity>) -> Result<Vec<Post>, RepoError> {
        let models = query.all(&self.db).await.map_err(query_error)?;
        self.hydrate(models).await
    }

    /// Turn post rows into domain posts.
    async fn hydrate(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let category_ids: BTreeSet<Uuid> = models.iter().map(|m| m.category_id).collect();
        let author_ids: BTreeSet<Uuid> = models.iter().map(|m| m.author_id).collect();

        let (categories, authors, links) = futures::try_join!(
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db),
            UserEntity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db),
            PostTagEntity::find()
                .filter(post_tag::Column::PostId.is_in(post_ids))
                .find_also_related(TagEntity)
                .order_by_asc(tag::Column::Name)
                .all(&self.db),
        )
        .map_err(query_error)?;

        let categories: HashMap<Uuid, CategoryRef> = categories
            .into_iter()
            .map(|c| (c.id, CategoryRef { id: c.id, name: c.name }))
            .collect();
        let authors: HashMap<Uuid, AuthorRef> = authors
            .into_iter()
            .map(|u| (u.id, AuthorRef { id: u.id, name: u.name }))
            .collect();
        let mut tags: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
        for (link, tag) in links {
            if let Some(tag) = tag {
                tags.entry(link.post_id).or_default().push(TagRef {
                    id: tag.id,
                    name: tag.name,
                });
            }
        }

        models
            .into_iter()
            .map(|m| {
                let category = categories.get(&m.category_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("post {} has dangling category", m.id))
                })?;
                let author = authors.get(&m.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("post {} has dangling author", m.id))
                })?;

                Ok(Post::restore(
                    m.id,
                    m.title,
                    m.content,
                    m.status.into(),
                    u32::try_from(m.reading_time).unwrap_or(0),
                    author,
                    category,
                    tags.remove(&m.id).unwrap_or_default(),
                    m.created_at.into(),
                    m.updated_at.into(),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.fetch(PostEntity::find_by_id(id)).await?;
        Ok(posts.into_iter().next())
    }

    /// Write the post row and replace its tag links in one transaction.
    async fn save(&self, mut entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;
        let now = Utc::now();

        let stored = PostEntity::find_by_id(entity.id)
            .one(&txn)
            .await
            .map_err(query_error)?;

        match &stored {
            Some(row) => entity.stamp(row.created_at.into(), now),
            None => entity.stamp(now, now),
        }

        let active_model = post::ActiveModel::from(&entity);
        if stored.is_some() {
            active_model.update(&txn).await.map_err(write_error)?;
        } else {
            active_model.insert(&txn).await.map_err(write_error)?;
        }

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(write_error)?;

        if !entity.tags.is_empty() {
            let links = entity.tag_ids().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(entity.id),
                tag_id: Set(tag_id),
            });
            PostTagEntity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(write_error)?;
        }

        txn.commit().await.map_err(query_error)?;
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(write_error)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(query_error)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_published_by_category_and_tag(
        &self,
        category_id: Uuid,
        tag_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        let query = Self::published()
            .filter(post::Column::CategoryId.eq(category_id))
            .inner_join(PostTagEntity)
            .filter(post_tag::Column::TagId.eq(tag_id));
        self.fetch(query).await
    }

    async fn find_published_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        self.fetch(Self::published().filter(post::Column::CategoryId.eq(category_id)))
            .await
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let query = Self::published()
            .inner_join(PostTagEntity)
            .filter(post_tag::Column::TagId.eq(tag_id));
        self.fetch(query).await
    }

    async fn find_all_published(&self) -> Result<Vec<Post>, RepoError> {
        self.fetch(Self::published()).await
    }

    async fn find_by_author_and_status(
        &self,
        author_id: Uuid,
        status: PostStatus,
    ) -> Result<Vec<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Status.eq(post::Status::from(status)))
            .order_by_asc(post::Column::CreatedAt);
        self.fetch(query).await
    }
}
