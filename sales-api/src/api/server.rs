//! API server for the sales service

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sales_cache::{
    cache::start_auto_cleanup, CacheConfig, DistributedCache, ExternalBranch, ExternalCustomer,
    ExternalProduct, FileDocumentMirror, MemoryCache, MemoryStore, Sale, SaleService,
    Sha256PasswordHasher, User, UserService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::routes::{
    create_sale, create_user, get_sale, get_user, health_check, list_sales, AppState,
};

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    /// Root of the JSON document mirror
    pub data_dir: PathBuf,
    /// Use Redis instead of the in-process cache
    pub redis_url: Option<String>,
    pub cache: CacheConfig,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            redis_url: None,
            cache: CacheConfig::default(),
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ApiServerConfig) -> Self {
        Self { config }
    }

    /// Create a new API server with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ApiServerConfig::default())
    }

    /// Connect the configured cache; the in-process cache is also returned
    /// on its own so its statistics can be reported
    async fn connect_cache(
        &self,
    ) -> Result<(Arc<dyn DistributedCache>, Option<Arc<MemoryCache>>)> {
        match &self.config.redis_url {
            #[cfg(feature = "redis")]
            Some(url) => {
                let cache = sales_cache::RedisCache::connect(url).await?;
                info!("Using Redis cache at {}", url);
                Ok((Arc::new(cache), None))
            }
            #[cfg(not(feature = "redis"))]
            Some(_) => anyhow::bail!("--redis-url requires the `redis` feature"),
            None => {
                let cache = Arc::new(MemoryCache::new(self.config.cache.clone()));
                tokio::spawn(start_auto_cleanup(cache.clone()));
                info!("Using in-process cache");
                let shared: Arc<dyn DistributedCache> = cache.clone();
                Ok((shared, Some(cache)))
            }
        }
    }

    /// Wire stores, cache and services into shared state
    pub async fn build_state(&self) -> Result<Arc<AppState>> {
        self.config.cache.validate()?;
        let (cache, memory_cache) = self.connect_cache().await?;
        let mirror = Arc::new(FileDocumentMirror::new(self.config.data_dir.join("documents")));

        let sales = SaleService::new(
            Arc::new(MemoryStore::<Sale>::new()),
            Arc::new(MemoryStore::<ExternalCustomer>::new()),
            Arc::new(MemoryStore::<ExternalBranch>::new()),
            Arc::new(MemoryStore::<ExternalProduct>::new()),
            cache.clone(),
            self.config.cache.clone(),
        )
        .with_mirror(mirror);

        let users = UserService::new(
            Arc::new(MemoryStore::<User>::new()),
            Arc::new(Sha256PasswordHasher),
            cache,
            self.config.cache.clone(),
        );

        Ok(Arc::new(AppState {
            sales: Arc::new(sales),
            users: Arc::new(users),
            memory_cache,
        }))
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        let state = self.build_state().await?;
        let app = router(state);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the router over prepared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/sales", post(create_sale).get(list_sales))
        .route("/api/sales/:id", get(get_sale))
        .route("/api/users", post(create_user))
        .route("/api/users/:id", get(get_user))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
