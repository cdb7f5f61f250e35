//! Configuration types for scrapeflow

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Crawl behavior configuration (request defaults, validation caps, HTTP client)
///
/// Groups settings related to how website crawls are performed and what
/// request parameters the dispatcher accepts. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CrawlConfig {
    /// Default crawl depth when a submission omits it (default: 2)
    #[serde(default = "default_depth")]
    pub default_depth: u32,

    /// Default page limit when a submission omits it (default: 100)
    #[serde(default = "default_max_pages")]
    pub default_max_pages: usize,

    /// Default worker-pool size when a submission omits it (default: 5)
    #[serde(default = "default_max_workers")]
    pub default_max_workers: usize,

    /// Default subdomain inclusion when a submission omits it (default: true)
    #[serde(default = "default_true")]
    pub default_include_subdomains: bool,

    /// Upper bound on accepted crawl depth (default: 10)
    #[serde(default = "default_depth_cap")]
    pub depth_cap: u32,

    /// Upper bound on accepted page limits (default: 10000)
    #[serde(default = "default_pages_cap")]
    pub pages_cap: usize,

    /// Upper bound on accepted worker-pool sizes (default: 64)
    #[serde(default = "default_workers_cap")]
    pub workers_cap: usize,

    /// Per-request timeout for page fetches, in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            default_max_pages: default_max_pages(),
            default_max_workers: default_max_workers(),
            default_include_subdomains: true,
            depth_cap: default_depth_cap(),
            pages_cap: default_pages_cap(),
            workers_cap: default_workers_cap(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Artifact store configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreConfig {
    /// Directory artifacts are written to (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix of the location string handed back to clients
    /// (default: "/downloads")
    #[serde(default = "default_public_base")]
    pub public_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_base: default_public_base(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8420)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve interactive Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for the scrapeflow service
///
/// Fields are organized into logical sub-configs:
/// - [`crawl`](CrawlConfig) — request defaults, validation caps, HTTP client
/// - [`store`](StoreConfig) — artifact output directory and public prefix
/// - [`api`](ApiConfig) — REST API binding and CORS
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Crawl behavior settings
    #[serde(flatten)]
    pub crawl: CrawlConfig,

    /// Artifact store settings
    #[serde(flatten)]
    pub store: StoreConfig,

    /// REST API settings
    #[serde(flatten)]
    pub api: ApiConfig,
}

fn default_depth() -> u32 {
    2
}

fn default_max_pages() -> usize {
    100
}

fn default_max_workers() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_depth_cap() -> u32 {
    10
}

fn default_pages_cap() -> usize {
    10_000
}

fn default_workers_cap() -> usize {
    64
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("scrapeflow/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_public_base() -> String {
    "/downloads".to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8420))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
