//! Plant Health Server - Main Entry Point
//!
//! Usage: `plant-health-server [--config <path>]`

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = match args.next() {
        Some(flag) if flag == "--config" => args.next(),
        other => other,
    };

    let settings = Settings::load(config_path.as_deref())?;
    init_logging(&settings.logging)?;

    info!("=== Plant Health Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model path: {}", settings.model.path);

    run_server(settings).await
}
