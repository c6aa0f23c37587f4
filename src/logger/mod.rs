//! Logger module
//!
//! Provides logging utilities for the receiver including:
//! - Service lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{http_version_label, redact_query, AccessLogEntry};

use crate::config::{Config, LogLevel};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(&config.logging)
}

/// Messages above the configured level are dropped.
/// Before `init()` everything up to `info` is printed.
fn enabled(level: LogLevel) -> bool {
    let threshold = writer::get().map_or(LogLevel::Info, writer::LogWriter::level);
    level <= threshold
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Access logging is only active once the writer is initialized
pub fn access_log_enabled() -> bool {
    writer::get().is_some_and(writer::LogWriter::access_log)
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry) {
    if let Some(w) = writer::get() {
        w.write_access(&entry.format(w.access_log_format()));
    }
}

pub fn log_service_start(base_url: &str, local_addr: &SocketAddr, config: &Config) {
    if !enabled(LogLevel::Info) {
        return;
    }
    write_info("======================================");
    write_info("OIDC redirect receiver started");
    write_info(&format!("Listening for requests at: {base_url}"));
    write_info(&format!("Bound to: {local_addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("Routes: GET /oidc-redirect, GET /protected");
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] Failed to serve connection: {err:?}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_bind_failed(base_url: &str, err: &impl std::fmt::Display) {
    log_error(&format!("✗ Failed to open listener at {base_url}: {err}"));
}

pub fn log_shutdown_requested(reason: &str) {
    log_info(&format!("Shutdown requested ({reason}), closing listener"));
}

pub fn log_service_stopped(local_addr: &SocketAddr) {
    log_info(&format!("✓ Listener on {local_addr} closed"));
}
