//! PostgreSQL repository implementations for categories, tags and users.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Category, Tag, Timestamped, User, WithPostCount};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository, TagRepository, UserRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
///
/// Names are unique ignoring case, which the `categories.name` index cannot
/// express, so `save` checks and writes under a table lock.
pub struct PostgresCategoryRepository {
    base: PostgresBaseRepository<CategoryEntity>,
}

impl PostgresCategoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            base: PostgresBaseRepository::new(db),
        }
    }

    fn db(&self) -> &DbConn {
        &self.base.db
    }
}

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// Keep the local part's first character only, so emails stay out of logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

fn attach_counts<T, M>(
    models: Vec<M>,
    counts: Vec<(Uuid, i64)>,
    id_of: impl Fn(&M) -> Uuid,
) -> Vec<WithPostCount<T>>
where
    T: From<M>,
{
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();
    models
        .into_iter()
        .map(|model| {
            let count = counts.get(&id_of(&model)).copied().unwrap_or(0);
            WithPostCount::new(T::from(model), u64::try_from(count).unwrap_or(0))
        })
        .collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

/// `LOWER(categories.name) = lower(name)`
fn name_matches(name: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((CategoryEntity, category::Column::Name))))
        .eq(name.to_lowercase())
}

#[async_trait]
impl BaseRepository<Category, Uuid> for PostgresCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        BaseRepository::<Category, Uuid>::find_by_id(&self.base, id).await
    }

    async fn save(&self, mut category: Category) -> Result<Category, RepoError> {
        let txn = self.db().begin().await.map_err(query_error)?;

        // Self-conflicting mode: concurrent category writers queue here, readers do not.
        txn.execute_unprepared("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
            .await
            .map_err(query_error)?;

        let clashes = CategoryEntity::find()
            .filter(name_matches(&category.name))
            .filter(category::Column::Id.ne(category.id))
            .count(&txn)
            .await
            .map_err(query_error)?;
        if clashes > 0 {
            return Err(RepoError::Constraint(format!(
                "Category already exists: {}",
                category.name
            )));
        }

        let now = Utc::now();
        let stored = CategoryEntity::find_by_id(category.id)
            .one(&txn)
            .await
            .map_err(query_error)?;

        let model = match stored {
            Some(stored) => {
                category.stamp(stored.created_at.into(), now);
                category::ActiveModel::from(category).update(&txn).await
            }
            None => {
                category.stamp(now, now);
                category::ActiveModel::from(category).insert(&txn).await
            }
        }
        .map_err(write_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        BaseRepository::<Category, Uuid>::delete(&self.base, id).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, RepoError> {
        let matches = CategoryEntity::find()
            .filter(name_matches(name))
            .count(self.db())
            .await
            .map_err(query_error)?;

        Ok(matches > 0)
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Category>>, RepoError> {
        let categories = CategoryEntity::find()
            .order_by_asc(category::Column::CreatedAt)
            .all(self.db())
            .await
            .map_err(query_error)?;

        let counts: Vec<(Uuid, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::CategoryId)
            .column_as(Expr::col((PostEntity, post::Column::Id)).count(), "post_count")
            .filter(post::Column::Status.eq(post::Status::Published))
            .group_by(post::Column::CategoryId)
            .into_tuple()
            .all(self.db())
            .await
            .map_err(query_error)?;

        Ok(attach_counts(categories, counts, |c: &category::Model| c.id))
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.eq(id))
            .count(self.db())
            .await
            .map_err(query_error)
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_names_in(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Name.is_in(names.iter().cloned()))
            .order_by_asc(tag::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &BTreeSet<Uuid>) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn save_all(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, RepoError> {
        if tags.is_empty() {
            return Ok(tags);
        }

        let now = Utc::now();
        let tags: Vec<Tag> = tags
            .into_iter()
            .map(|mut tag| {
                tag.stamp(now, now);
                tag
            })
            .collect();

        // One multi-row INSERT: either every tag lands or none does.
        TagEntity::insert_many(tags.iter().cloned().map(tag::ActiveModel::from))
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(count = tags.len(), "Inserted tags");
        Ok(tags)
    }

    async fn find_all_with_post_count(&self) -> Result<Vec<WithPostCount<Tag>>, RepoError> {
        let tags = TagEntity::find()
            .order_by_asc(tag::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let counts: Vec<(Uuid, i64)> = PostTagEntity::find()
            .select_only()
            .column(post_tag::Column::TagId)
            .column_as(
                Expr::col((PostTagEntity, post_tag::Column::PostId)).count(),
                "post_count",
            )
            .join(JoinType::InnerJoin, post_tag::Relation::Post.def())
            .filter(post::Column::Status.eq(post::Status::Published))
            .group_by(post_tag::Column::TagId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(attach_counts(tags, counts, |t: &tag::Model| t.id))
    }

    async fn count_posts(&self, id: Uuid) -> Result<u64, RepoError> {
        PostTagEntity::find()
            .filter(post_tag::Column::TagId.eq(id))
            .count(&self.db)
            .await
            .map_err(query_error)
    }
}
