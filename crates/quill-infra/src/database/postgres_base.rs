use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};
use uuid::Uuid;

use quill_core::domain::Timestamped;
use quill_core::error::RepoError;
use quill_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// Map a read failure.
pub(crate) fn query_error(e: DbErr) -> RepoError {
    match e {
        DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Map a write failure; unique and foreign-key violations become constraint errors.
pub(crate) fn write_error(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            return RepoError::Constraint("Entity already exists".to_string());
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            return RepoError::Constraint("Entity is still referenced".to_string());
        }
        _ => {}
    }

    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else if err_str.contains("foreign key") {
        RepoError::Constraint("Entity is still referenced".to_string())
    } else {
        query_error(e)
    }
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: Timestamped + From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, mut entity: T) -> Result<T, RepoError> {
        let now = Utc::now();
        let stored = E::find_by_id(entity.id())
            .one(&self.db)
            .await
            .map_err(query_error)?
            .map(T::from);

        let model = match stored {
            Some(stored) => {
                entity.stamp(stored.created_at(), now);
                let active_model: E::ActiveModel = entity.into();
                active_model.update(&self.db).await
            }
            None => {
                entity.stamp(now, now);
                let active_model: E::ActiveModel = entity.into();
                active_model.insert(&self.db).await
            }
        }
        .map_err(write_error)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn test_write_error_maps_key_violations_to_constraint() {
        let restricted = DbErr::Exec(RuntimeErr::Internal(
            "update or delete on table \"categories\" violates foreign key constraint \"fk_posts_category\""
                .to_string(),
        ));
        assert!(matches!(write_error(restricted), RepoError::Constraint(_)));

        let duplicate = DbErr::Exec(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"tags_name_key\"".to_string(),
        ));
        assert!(matches!(write_error(duplicate), RepoError::Constraint(_)));

        let other = DbErr::Custom("syntax error".to_string());
        assert!(matches!(write_error(other), RepoError::Query(_)));
    }
}
