//! Application configuration.
//!
//! The frontend is served by the backend on the same port, so API paths are
//! relative by default.

/// Backend API base URL.
///
/// Empty means same origin.
pub const BACKEND_URL: &str = "";

/// Application name shown in the header.
pub const APP_NAME: &str = "camconv";

/// Maximum file size for upload (in bytes).
///
/// Matches the backend's default `CAMCONV_MAX_UPLOAD_MB`.
pub const MAX_FILE_SIZE: f64 = 50.0 * 1024.0 * 1024.0;

/// Maximum logs to keep in memory.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Target epoch preselected in the target panel.
pub const DEFAULT_TARGET_EPOCH: f64 = 2002.0;
