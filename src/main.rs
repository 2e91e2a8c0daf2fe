use servedir::config::{self, AppState, Config};
use servedir::{logger, server};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let state = match AppState::new(cfg) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            logger::log_error(&format!("Invalid document root: {e}"));
            return Err(e.into());
        }
    };

    runtime.block_on(server::run(state, server::shutdown_signal()))
}
