use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::constants::{
    KEY_API_KEY, KEY_API_KEY_LEGACY, KEY_DIRECTORY, KEY_DIRECTORY_LEGACY, KEY_STORAGE_URL,
    KEY_STORAGE_URL_LEGACY, KEY_UPLOAD_MODE, OPERATIONAL_DEFAULTS,
};
use crate::error::StoreError;

use super::model::{FieldSource, ResolvedConfig};

/// Values found in the two persisted stores, before precedence merging.
///
/// All fields are raw strings as read from disk; normalization and
/// validation happen in the resolver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedSettings {
    pub storage_url: Option<String>,
    pub api_key: Option<String>,
    pub directory: Option<String>,
    pub upload_mode: Option<String>,
}

/// Which stores were rewritten by a persist call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistOutcome {
    pub non_secret: bool,
    pub secret: bool,
}

impl PersistOutcome {
    pub fn skipped() -> Self {
        PersistOutcome {
            non_secret: false,
            secret: false,
        }
    }
}

/// Parse key=value lines. Blank lines and `#` comments are skipped;
/// values keep everything after the first `=` verbatim.
fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

fn read_entries(path: &Path) -> Result<Vec<(String, String)>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_env_lines(&content))
}

/// First non-empty value among `keys`, in order. Lets current key names
/// shadow the legacy ones written by older versions of the tool.
fn lookup(entries: &[(String, String)], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Load both persisted stores. Missing files are treated as empty, not
/// as errors; a first run starts from nothing.
pub fn load_stores(
    non_secret_path: &Path,
    secret_path: &Path,
) -> Result<PersistedSettings, StoreError> {
    let non_secret = read_entries(non_secret_path)?;
    let secret = read_entries(secret_path)?;

    let settings = PersistedSettings {
        storage_url: lookup(&non_secret, &[KEY_STORAGE_URL, KEY_STORAGE_URL_LEGACY]),
        // The key must never live in the non-secret store, so it is only
        // looked up in the secret one.
        api_key: lookup(&secret, &[KEY_API_KEY, KEY_API_KEY_LEGACY]),
        directory: lookup(&non_secret, &[KEY_DIRECTORY, KEY_DIRECTORY_LEGACY]),
        upload_mode: lookup(&non_secret, &[KEY_UPLOAD_MODE]),
    };
    debug!(
        "Loaded persisted settings: url={}, key={}, directory={}, mode={}",
        settings.storage_url.is_some(),
        settings.api_key.is_some(),
        settings.directory.is_some(),
        settings.upload_mode.is_some(),
    );
    Ok(settings)
}

/// Persist a resolved configuration to the two stores.
///
/// Skips every write when no field was freshly supplied this run, so a
/// run fed entirely from flags and persisted values leaves durable state
/// untouched. Flag-pinned fields are one-off overrides: the store keeps
/// its previous value for them (or omits the key when there is none).
///
/// The secret store is rewritten as a whole, never appended, and only
/// when its content would actually change.
pub fn persist(
    resolved: &ResolvedConfig,
    non_secret_path: &Path,
    secret_path: &Path,
) -> Result<PersistOutcome, StoreError> {
    if !resolved.sources.any_fresh() {
        debug!("No freshly supplied settings, skipping persistence");
        return Ok(PersistOutcome::skipped());
    }

    let non_secret = write_non_secret(resolved, non_secret_path)?;
    let secret = write_secret(resolved, secret_path)?;
    Ok(PersistOutcome { non_secret, secret })
}

fn write_non_secret(resolved: &ResolvedConfig, path: &Path) -> Result<bool, StoreError> {
    let existing = read_entries(path)?;
    let previous = |keys: &[&str]| lookup(&existing, keys);

    // A flag value is never written; the previously persisted value (if
    // any) survives the override.
    let keep_or = |source: FieldSource, current: &str, keys: &[&str]| -> Option<String> {
        if source == FieldSource::Flag {
            previous(keys)
        } else {
            Some(current.to_string())
        }
    };

    let mut lines: Vec<String> = OPERATIONAL_DEFAULTS
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();

    if let Some(url) = keep_or(
        resolved.sources.storage_url,
        &resolved.config.storage_url,
        &[KEY_STORAGE_URL, KEY_STORAGE_URL_LEGACY],
    ) {
        lines.push(format!("{KEY_STORAGE_URL}={url}"));
    }
    if let Some(directory) = keep_or(
        resolved.sources.directory,
        &resolved.config.directory,
        &[KEY_DIRECTORY, KEY_DIRECTORY_LEGACY],
    ) {
        lines.push(format!("{KEY_DIRECTORY}={directory}"));
    }
    if let Some(mode) = keep_or(
        resolved.sources.upload_mode,
        &resolved.config.upload_mode.to_string(),
        &[KEY_UPLOAD_MODE],
    ) {
        lines.push(format!("{KEY_UPLOAD_MODE}={mode}"));
    }

    let content = format!("{}\n", lines.join("\n"));
    fs::write(path, content).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Settings written to {}", path.display());
    Ok(true)
}

fn write_secret(resolved: &ResolvedConfig, path: &Path) -> Result<bool, StoreError> {
    // A key passed via flag is a one-off override, never persisted.
    if resolved.sources.api_key == FieldSource::Flag {
        return Ok(false);
    }

    // Compared as whole file content, key name included: a store still
    // using the legacy API_KEY name gets rewritten once under the
    // current name.
    let content = format!("{KEY_API_KEY}={}\n", resolved.config.api_key);
    if path.exists() {
        let current = fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if current == content {
            debug!("Secret store already holds the current API key");
            return Ok(false);
        }
    }

    fs::write(path, content).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("API key written to {}", path.display());
    Ok(true)
}
