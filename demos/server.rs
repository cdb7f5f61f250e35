//! REST API server example
//!
//! Runs scrapeflow with the REST API enabled, allowing control via HTTP.
//!
//! After starting, you can:
//! - Submit a crawl via POST http://localhost:8420/scrape
//! - Poll a task via GET http://localhost:8420/task/{id}
//! - Stream events via GET http://localhost:8420/events
//! - View Swagger UI at http://localhost:8420/swagger-ui

use scrapeflow::{ApiConfig, Config, CrawlConfig, Dispatcher, StoreConfig};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration
    let config = Config {
        crawl: CrawlConfig {
            default_depth: 2,
            default_max_pages: 100,
            ..Default::default()
        },
        store: StoreConfig {
            output_dir: "downloads".into(),
            ..Default::default()
        },
        api: ApiConfig {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8420)),
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
            swagger_ui: true,
        },
    };

    // Create the dispatcher and spawn the API server
    let dispatcher = Arc::new(Dispatcher::new(config)?);
    let server = dispatcher.spawn_api_server();

    println!("🚀 Starting scrapeflow REST API server");
    println!("📖 Swagger UI: http://localhost:8420/swagger-ui");
    println!("🔄 Events stream: http://localhost:8420/events");
    println!();
    println!("Example commands:");
    println!("  # Submit a crawl");
    println!("  curl -X POST http://localhost:8420/scrape \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"source\": \"https://example.com\", \"depth\": 1}}'");
    println!();
    println!("  # Poll the task");
    println!("  curl http://localhost:8420/task/<task_id>");
    println!();
    println!("Press Ctrl+C to stop");

    scrapeflow::wait_for_shutdown().await;
    server.abort();

    Ok(())
}
