//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level >= Level::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log at the given level
fn write_error(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Startup banner; always printed regardless of level
pub fn log_server_start(addr: &SocketAddr, root: &Path, config: &Config) {
    let lines = [
        "======================================".to_string(),
        format!("Serving {} on {}", root.display(), config.display_url()),
        format!("Bound to: {addr}"),
        format!("Log level: {}", config.logging.level),
        config
            .server
            .workers
            .map_or_else(|| "Worker threads: CPU cores".to_string(), |w| format!("Worker threads: {w}")),
        "Press Ctrl+C to stop".to_string(),
        "======================================".to_string(),
    ];
    for line in lines {
        match writer::get() {
            Some(w) => w.write_info(&line),
            None => println!("{line}"),
        }
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_error(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(Level::Warn, &format!("[WARN] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    write_error(Level::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_bind_failed(addr: &SocketAddr, err: &std::io::Error) {
    log_error(&format!("Failed to bind {addr}: {err}"));
}

pub fn log_shutdown_started() {
    log_info("Shutdown signal received, no longer accepting connections");
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        log_info("All connections closed, exiting");
    } else {
        log_warning("Shutdown timeout elapsed with connections still open, exiting");
    }
}
