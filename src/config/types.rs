// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    #[serde(default)]
    pub mime: MimeConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Document root and directory handling
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Directory all request paths are resolved against
    pub root: String,
    /// Files tried, in order, when a directory is requested
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Render an HTML listing for directories without an index file
    pub directory_listing: bool,
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

/// Extra extension mappings layered over the built-in MIME table
#[derive(Debug, Deserialize, Clone)]
pub struct MimeConfig {
    /// Extension (with or without leading dot) to content type
    #[serde(default)]
    pub overrides: HashMap<String, String>,
    #[serde(default = "default_content_type")]
    pub default_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            default_type: default_content_type(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "common".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds an idle keep-alive connection waits for its next request; 0 disables keep-alive
    pub keep_alive_timeout: u64,
    /// Seconds allowed to receive a request head when keep-alive is disabled
    pub read_timeout: u64,
    /// Seconds a response write may make no progress before the connection is dropped
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds open connections get to finish after a shutdown signal
    pub shutdown_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub cache_control: String,
}
