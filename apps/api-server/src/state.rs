//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, PasswordService, PostRepository, TagRepository, UserRepository,
};
use quill_core::services::{CategoryService, PostService, TagService, UserService};
use quill_infra::{Argon2PasswordService, DatabaseConfig, InMemoryStore};

/// The four stores the services run on.
pub struct Stores {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            posts: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            users: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: quill_infra::database::DbConn) -> Self {
        use quill_infra::database::{
            PostgresCategoryRepository, PostgresPostRepository, PostgresTagRepository,
            PostgresUserRepository,
        };

        Self {
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.clone())),
            users: Arc::new(PostgresUserRepository::new(db)),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub categories: CategoryService,
    pub tags: TagService,
    pub users: UserService,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let stores = Self::open_stores(db_config).await;
        let state = Self::from_stores(stores, Arc::new(Argon2PasswordService::new()));

        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over already-opened stores.
    pub fn from_stores(stores: Stores, passwords: Arc<dyn PasswordService>) -> Self {
        let categories = CategoryService::new(stores.categories);
        let tags = TagService::new(stores.tags);

        Self {
            posts: PostService::new(stores.posts, categories.clone(), tags.clone()),
            categories,
            tags,
            users: UserService::new(stores.users, passwords),
        }
    }

    #[cfg(feature = "postgres")]
    async fn open_stores(db_config: Option<&DatabaseConfig>) -> Stores {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Stores::in_memory();
        };

        match quill_infra::database::connect(config).await {
            Ok(db) => Stores::postgres(db),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Stores::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn open_stores(_db_config: Option<&DatabaseConfig>) -> Stores {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Stores::in_memory()
    }
}
