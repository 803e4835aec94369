use clap::ValueEnum;

/// Whether the network upload step executes or the run only persists
/// configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadMode {
    /// Upload the archive to the map-storage endpoint
    MapStorage,
    /// Skip the upload, only validate and persist configuration
    Custom,
}

impl UploadMode {
    /// Parse a value as persisted in the non-secret store.
    pub fn from_store_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MAP_STORAGE" => Some(UploadMode::MapStorage),
            "CUSTOM" => Some(UploadMode::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::MapStorage => write!(f, "MAP_STORAGE"),
            UploadMode::Custom => write!(f, "CUSTOM"),
        }
    }
}

/// Where a resolved field value came from this run.
///
/// Replaces the hidden mutable "was this field freshly entered" flags of
/// the historical upload scripts with explicit provenance threaded from
/// the resolver into the persistence writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSource {
    /// Explicit CLI flag; a one-off override, never persisted
    Flag,
    /// Loaded from a persisted store
    Store,
    /// Entered at an interactive prompt this run
    Prompt,
    /// Built-in default (directory and upload mode only)
    Default,
}

impl FieldSource {
    /// Freshly supplied values are the ones worth persisting.
    pub fn is_fresh(self) -> bool {
        matches!(self, FieldSource::Prompt)
    }
}

/// Per-field provenance for a resolved configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Provenance {
    pub storage_url: FieldSource,
    pub api_key: FieldSource,
    pub directory: FieldSource,
    pub upload_mode: FieldSource,
}

impl Provenance {
    /// True when at least one field was entered at a prompt this run;
    /// only then do the persisted stores get touched.
    pub fn any_fresh(&self) -> bool {
        self.storage_url.is_fresh()
            || self.api_key.is_fresh()
            || self.directory.is_fresh()
            || self.upload_mode.is_fresh()
    }
}

/// A fully resolved upload configuration.
///
/// Mandatory fields are non-empty and the storage URL has passed the
/// liveness check by the time a value of this type exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL of the storage endpoint, normalized to one trailing `/`
    pub storage_url: String,
    /// Bearer credential; only ever echoed through [`mask_secret`]
    pub api_key: String,
    /// Destination path segment on the remote store; may be empty (root)
    pub directory: String,
    pub upload_mode: UploadMode,
}

/// A resolved configuration together with where each field came from.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub config: Config,
    pub sources: Provenance,
}

/// Mask a credential for interactive echo and logs.
///
/// Keeps just enough of the prefix to let the operator recognize which
/// key is in use.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        let prefix: String = secret.chars().take(4).collect();
        format!("{prefix}****")
    }
}
