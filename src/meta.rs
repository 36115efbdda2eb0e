//! Static application and version metadata.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Bumped whenever the persisted database schema changes shape.
pub const APP_DB_VERSION: u32 = 227;
/// Bumped whenever the sync wire format changes incompatibly.
pub const SYNC_VERSION: u32 = 31;
pub const CLIPPER_PROTOCOL_VERSION: &str = "1.0";

/// Environment variable overriding the default data directory.
pub const DATA_DIR_ENV: &str = "ARBOR_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub app_version: String,
    pub db_version: u32,
    pub sync_version: u32,
    pub build_date: String,
    pub build_revision: String,
    pub data_directory: PathBuf,
    pub clipper_protocol_version: String,
    /// Server-side UTC timestamp, RFC 3339 with millisecond precision. Sent
    /// to clients so they can infer the server's clock/timezone offset.
    pub utc_date_time: String,
}

static APP_INFO: Lazy<AppInfo> = Lazy::new(|| AppInfo {
    app_version: env!("CARGO_PKG_VERSION").to_string(),
    db_version: APP_DB_VERSION,
    sync_version: SYNC_VERSION,
    build_date: option_env!("ARBOR_BUILD_DATE").unwrap_or("unknown").to_string(),
    build_revision: option_env!("ARBOR_BUILD_REVISION")
        .unwrap_or("unknown")
        .to_string(),
    data_directory: data_directory(),
    clipper_protocol_version: CLIPPER_PROTOCOL_VERSION.to_string(),
    utc_date_time: utc_date_time(),
});

/// Static metadata snapshot. The `utc_date_time` field is frozen at first
/// access; callers needing a live timestamp should use [`utc_date_time`].
pub fn app_info() -> &'static AppInfo {
    &APP_INFO
}

pub fn utc_date_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn data_directory() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join("arbor-data");
    }
    PathBuf::from("arbor-data")
}
