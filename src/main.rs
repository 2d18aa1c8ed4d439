//! webprint - render web pages to PDF through a request-scoped Chrome
//! session with a bundled reader-view extension.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use webprint::config::{DEFAULT_CHROME_PATH, DEFAULT_EXTENSION_ID, ServiceConfig};
use webprint::server;

/// webprint CLI.
#[derive(Parser)]
#[command(name = "webprint")]
#[command(about = "HTTP service that renders web pages to PDF")]
#[command(version)]
struct Cli {
    /// Listen host
    #[arg(long, env = "WEBPRINT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(long, env = "WEBPRINT_PORT", default_value_t = 3000)]
    port: u16,

    /// Path to the Chrome/Chromium executable
    #[arg(long, env = "WEBPRINT_CHROME", default_value = DEFAULT_CHROME_PATH)]
    chrome_path: PathBuf,

    /// Directory holding the unpacked extension
    #[arg(long, env = "WEBPRINT_EXTENSION_DIR", default_value = "extension")]
    extension_dir: PathBuf,

    /// Extension identifier
    #[arg(long, env = "WEBPRINT_EXTENSION_ID", default_value = DEFAULT_EXTENSION_ID)]
    extension_id: String,

    /// Chrome remote debugging port
    #[arg(long, env = "WEBPRINT_DEBUG_PORT", default_value_t = 9222)]
    debug_port: u16,

    /// Run Chrome with a visible window instead of headless
    #[arg(long, env = "WEBPRINT_HEADFUL")]
    headful: bool,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config = ServiceConfig {
        host: cli.host,
        port: cli.port,
        chrome_path: cli.chrome_path,
        extension_dir: cli.extension_dir,
        extension_id: cli.extension_id,
        debug_port: cli.debug_port,
        headless: !cli.headful,
    };

    if let Err(e) = server::run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
