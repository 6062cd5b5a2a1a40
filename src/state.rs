use crate::config::AppConfig;
use crate::metrics::repo::{MemoryMetricsStore, MetricsStore, PgMetricsStore};
use crate::upstream::UpstreamClient;
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: UpstreamClient,
    /// Present only when a database is configured.
    pub db: Option<PgPool>,
    pub metrics: Option<Arc<dyn MetricsStore>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let upstream = UpstreamClient::new().context("build http client")?;

        let db = match &config.database_url {
            Some(url) => Some(
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?,
            ),
            None => {
                tracing::warn!("DATABASE_URL not set; metrics routes are disabled");
                None
            }
        };

        let metrics = db
            .clone()
            .map(|pool| Arc::new(PgMetricsStore::new(pool)) as Arc<dyn MetricsStore>);

        Ok(Self {
            config,
            upstream,
            db,
            metrics,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        upstream: UpstreamClient,
        metrics: Option<Arc<dyn MetricsStore>>,
    ) -> Self {
        Self {
            config,
            upstream,
            db: None,
            metrics,
        }
    }

    /// State with an in-memory metrics store and the test signing secret.
    pub fn fake() -> Self {
        Self::fake_with(AppConfig::default())
    }

    pub fn fake_with(mut config: AppConfig) -> Self {
        if config.auth.jwt_secret.is_none() {
            config.auth.jwt_secret = Some("test-secret".into());
        }
        let upstream = UpstreamClient::new().expect("http client builds");
        let metrics = Arc::new(MemoryMetricsStore::default()) as Arc<dyn MetricsStore>;
        Self::from_parts(Arc::new(config), upstream, Some(metrics))
    }
}
