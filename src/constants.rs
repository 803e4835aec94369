//! Global constants for map-uploader.
//!
//! This module centralizes hardcoded values (store paths, env keys,
//! endpoint paths) so configuration changes stay in one place.

/// Built map directory packaged by default
pub const DEFAULT_SOURCE_DIR: &str = "dist";

/// Archive produced in the working directory
pub const ARCHIVE_NAME: &str = "dist.zip";

/// Fallback destination directory when no VCS metadata is available
pub const DEFAULT_DIRECTORY: &str = "maps";

/// Non-secret persisted store (key=value lines)
pub const NON_SECRET_STORE: &str = ".env";

/// Secret persisted store, holds only the API key
pub const SECRET_STORE: &str = ".env.secret";

/// Liveness endpoint appended to the normalized storage URL
pub const PING_ENDPOINT: &str = "ping";

/// Upload endpoint appended to the normalized storage URL
pub const UPLOAD_ENDPOINT: &str = "upload";

// Non-secret store keys. The legacy names were written by older versions
// of the upload script and are still read, never written.
pub const KEY_STORAGE_URL: &str = "MAP_STORAGE_URL";
pub const KEY_STORAGE_URL_LEGACY: &str = "URL_MAP_STORAGE";
pub const KEY_DIRECTORY: &str = "UPLOAD_DIRECTORY";
pub const KEY_DIRECTORY_LEGACY: &str = "DIRECTORY";
pub const KEY_UPLOAD_MODE: &str = "UPLOAD_MODE";

// Secret store keys
pub const KEY_API_KEY: &str = "MAP_STORAGE_API_KEY";
pub const KEY_API_KEY_LEGACY: &str = "API_KEY";

/// Fixed operational settings written verbatim on first persist
pub const OPERATIONAL_DEFAULTS: &[(&str, &str)] = &[
    ("LOG_LEVEL", "1"),
    ("TILESET_OPTIMIZATION", "false"),
    ("TILESET_OPTIMIZATION_QUALITY_MIN", "0.9"),
    ("TILESET_OPTIMIZATION_QUALITY_MAX", "1.0"),
];

/// Deflate level used for the archive (maximum compression)
pub const ARCHIVE_COMPRESSION_LEVEL: i32 = 9;
