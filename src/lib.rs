pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;

use std::sync::Arc;

pub use config::Config;
pub use db::Store;
use services::{
    SeaOrmEpisodeService, SeaOrmPodcastService, SeaOrmRatingService, SeaOrmUserService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The wired-up service layer. An HTTP frontend (or a test) gets one of
/// these and talks to the traits, never to the repositories directly.
#[derive(Clone)]
pub struct Catalog {
    pub store: Arc<Store>,
    pub users: SeaOrmUserService,
    pub podcasts: SeaOrmPodcastService,
    pub episodes: SeaOrmEpisodeService,
    pub ratings: SeaOrmRatingService,
}

impl Catalog {
    /// Wires all services over an already-connected store.
    #[must_use]
    pub fn new(store: Store, config: &Config) -> Self {
        let store = Arc::new(store);
        Self {
            users: SeaOrmUserService::new(Arc::clone(&store), config.security.clone()),
            podcasts: SeaOrmPodcastService::new(Arc::clone(&store)),
            episodes: SeaOrmEpisodeService::new(Arc::clone(&store), config.content.clone()),
            ratings: SeaOrmRatingService::new(Arc::clone(&store), config.content.clone()),
            store,
        }
    }

    /// Connects to the configured database, runs migrations, and wires the
    /// service layer.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or a migration
    /// fails.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        Ok(Self::new(store, config))
    }
}

/// Loads configuration, initializes logging, and connects the catalog.
/// Embedding applications call this once at startup.
///
/// # Errors
///
/// Returns an error when the config file is invalid or the database cannot
/// be opened.
pub async fn bootstrap() -> anyhow::Result<Catalog> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(
        "podarr v{} starting (db: {})",
        env!("CARGO_PKG_VERSION"),
        config.general.database_path
    );

    Catalog::connect(&config).await
}
