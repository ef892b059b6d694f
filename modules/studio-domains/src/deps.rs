use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use studio_common::file_config::load_or_default;
use studio_common::{AppConfig, FileConfig, LeadScorer, RankingConfig};

/// Central dependency container handed to every persistence operation.
#[derive(Clone)]
pub struct StudioDeps {
    pub db_pool: PgPool,
    pub file_config: Arc<FileConfig>,
    scorer: Arc<LeadScorer>,
}

impl StudioDeps {
    /// Connect to Postgres and load the TOML config named by `STUDIO_CONFIG`.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let file_config = load_or_default(config.config_path.as_deref())?;
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Self::from_pool(pool, file_config)
    }

    pub fn from_pool(db_pool: PgPool, file_config: FileConfig) -> Result<Self> {
        let scorer = LeadScorer::new(&file_config.scoring).context("Invalid scoring config")?;
        Ok(Self {
            db_pool,
            file_config: Arc::new(file_config),
            scorer: Arc::new(scorer),
        })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }

    pub fn scorer(&self) -> &LeadScorer {
        &self.scorer
    }

    pub fn ranking(&self) -> RankingConfig {
        self.file_config.ranking
    }
}
