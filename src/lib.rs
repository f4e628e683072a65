use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod error;
pub mod http;
pub mod location;
pub mod models;
pub mod platform;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{ClientError, LocationError, StorageError};
pub use http::HttpClient;
pub use location::{Location, LocationProvider, calculate_distance, format_distance};
pub use platform::Navigator;
pub use storage::{Storage, TOKEN_KEY};
pub use store::{ActionResult, AuthStore, SpotStore};

/// 客户端聚合状态
/// 显式持有存储、HTTP 客户端和各领域仓库，不使用全局单例
pub struct ClientState {
    pub config: Config,
    pub storage: Arc<Storage>,
    pub http: Arc<HttpClient>,
    pub auth: AuthStore,
    pub spot: SpotStore,
}

impl ClientState {
    /// 初始化：建存储、建 HTTP 客户端、各仓库从持久化状态恢复
    pub fn init(
        config: Config,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Result<Self, ClientError> {
        let storage = Arc::new(Storage::new(&config.storage_dir));

        let mut http = HttpClient::new(&config, storage.clone())?;
        if let Some(navigator) = &navigator {
            http = http.with_navigator(navigator.clone());
        }
        let http = Arc::new(http);

        let auth = AuthStore::new(http.clone(), storage.clone(), navigator);
        let spot = SpotStore::new(http.clone());

        Ok(ClientState {
            config,
            storage,
            http,
            auth,
            spot,
        })
    }
}

/// 初始化日志
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
