//! Logger module
//!
//! Provides logging utilities for the dev server including:
//! - Server lifecycle logging
//! - Access logging
//! - Error and warning logging
//! - Deduplicated ("warn once") degradation warnings

use crate::config::Config;
use chrono::Local;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Virtual page server started successfully");
    println!("Listening on: http://{addr}");
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Public directory: {}", config.server.public_dir);
    println!("======================================\n");
}

/// Log one access line with timestamp, method, path, status, and body size
pub fn log_access(method: &str, path: &str, status: u16, body_bytes: usize) {
    println!(
        "[{}] {method} {path} {status} {body_bytes}B",
        Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

/// Deduplicated warning state.
///
/// Degraded modes (missing template file, render engine unavailable) warn
/// exactly once per key for the lifetime of the instance. The state is an
/// explicit context object owned by the application state rather than a
/// process-wide flag, so independent server instances warn independently.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    seen: Arc<Mutex<HashSet<String>>>,
}

impl Warnings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `message` as a warning unless `key` has already warned
    pub fn warn_once(&self, key: &str, message: &str) {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if seen.insert(key.to_string()) {
            log_warning(message);
        }
    }

    /// Whether `key` has warned already
    #[must_use]
    pub fn was_warned(&self, key: &str) -> bool {
        match self.seen.lock() {
            Ok(guard) => guard.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }

    /// Number of distinct warnings emitted so far
    #[must_use]
    pub fn count(&self) -> usize {
        match self.seen.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
