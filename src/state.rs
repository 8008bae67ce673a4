use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::users::{
    repo::{InMemoryUserStore, PgUserStore, UserStore},
    services::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn UserStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
                let pool = db::connect(url, config.db_max_connections).await?;
                db::run_migrations(&pool).await;
                Arc::new(PgUserStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory user store; data is lost on restart");
                Arc::new(InMemoryUserStore::new())
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        let users = UserService::new(store, config.password_work_factor);
        Self { users, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            password_work_factor: 1,
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(InMemoryUserStore::new()), config)
    }
}
