// Configuration module entry point
// Loads layered configuration and builds the read-only runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, FilesConfig, HttpConfig, LoggingConfig, MimeConfig, PerformanceConfig, ServerConfig,
};

/// Config file name (without extension) used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `SERVEDIR_SERVER__PORT=9000`
const ENV_PREFIX: &str = "SERVEDIR";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error: defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("files.root", ".")?
            .set_default("files.directory_listing", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 5)?
            .set_default(
                "http.server_name",
                concat!("servedir/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.cache_control", "no-cache")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// URL shown in the startup banner; wildcard hosts are shown as localhost
    pub fn display_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.server.port)
    }
}
