use std::sync::Arc;

use redis::aio::ConnectionManager as RedisConnectionManager;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sqlx::postgres::PgPool;

use crate::config::Config;
use crate::queue::{JobQueue, RedisQueue};
use crate::repositories::Stores;
use crate::services::{ApplicationService, ProjectService, Services};

/// Application state shared by every caller of the services
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    /// Outbound email queue drained by the worker
    pub job_queue: Arc<dyn JobQueue>,
    pub stores: Stores,
    pub projects: ProjectService,
    pub applications: ApplicationService,
}

impl AppState {
    /// Connect to PostgreSQL and Redis, run migrations and wire the services
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let job_queue: Arc<dyn JobQueue> = Arc::new(connect_queue(&config).await?);
        Self::with_queue(config, job_queue).await
    }

    /// Create AppState with a custom queue
    pub async fn with_queue(
        config: Config,
        job_queue: Arc<dyn JobQueue>,
    ) -> Result<Self, AppStateError> {
        let db = connect_database(&config).await?;
        let stores = Stores::postgres(db.clone());
        let Services {
            projects,
            applications,
        } = Services::new(&config, stores.clone(), job_queue.clone());

        Ok(Self {
            db,
            config,
            job_queue,
            stores,
            projects,
            applications,
        })
    }
}

/// Run pending migrations with SQLx, then open the SeaORM pool
async fn connect_database(config: &Config) -> Result<DatabaseConnection, AppStateError> {
    let pg_pool = PgPool::connect(&config.database_url)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .map_err(|e| AppStateError::Migration(e.to_string()))?;
    pg_pool.close().await;

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(20)
        .min_connections(2)
        .sqlx_logging(true);

    Database::connect(opt)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))
}

/// Redis-backed email queue
pub async fn connect_queue(config: &Config) -> Result<RedisQueue, AppStateError> {
    let redis_client = redis::Client::open(config.redis_url.as_str())
        .map_err(|e| AppStateError::Redis(e.to_string()))?;
    let redis = RedisConnectionManager::new(redis_client)
        .await
        .map_err(|e| AppStateError::Redis(e.to_string()))?;

    Ok(RedisQueue::new(redis))
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Redis connection error: {0}")]
    Redis(String),
}
