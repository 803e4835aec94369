use log::{info, warn};

use crate::constants::{
    DEFAULT_DIRECTORY, KEY_API_KEY, KEY_STORAGE_URL, NON_SECRET_STORE, SECRET_STORE,
};
use crate::error::ConfigError;
use crate::prompt::Prompter;

use super::model::{Config, FieldSource, Provenance, ResolvedConfig, UploadMode, mask_secret};
use super::store::PersistedSettings;
use super::validate::{check_storage_url, normalize_storage_url, StorageProbe};

/// Field values supplied on the command line. Flags always win over
/// persisted values and prompts.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub storage_url: Option<String>,
    pub api_key: Option<String>,
    pub directory: Option<String>,
    pub upload_mode: Option<UploadMode>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Merge CLI overrides, persisted settings, and (when attached to a
/// terminal) interactive prompts into one validated configuration.
///
/// Precedence per field is strict: flag > persisted store > prompt >
/// built-in default, where only `directory` and `upload_mode` have a
/// default. The storage URL must answer the liveness check before it is
/// accepted, so a dead endpoint is caught here and not at upload time.
///
/// In non-interactive mode no prompt is ever issued: a missing mandatory
/// field or a failed liveness check aborts resolution instead.
pub fn resolve(
    overrides: &Overrides,
    persisted: &PersistedSettings,
    vcs_slug: Option<&str>,
    probe: &dyn StorageProbe,
    prompter: &mut dyn Prompter,
    interactive: bool,
) -> Result<ResolvedConfig, ConfigError> {
    let (storage_url, url_source) =
        resolve_storage_url(overrides, persisted, probe, prompter, interactive)?;
    let (api_key, key_source) = resolve_api_key(overrides, persisted, prompter, interactive)?;
    let (directory, dir_source) =
        resolve_directory(overrides, persisted, vcs_slug, prompter, interactive)?;
    let (upload_mode, mode_source) = resolve_upload_mode(overrides, persisted);

    Ok(ResolvedConfig {
        config: Config {
            storage_url,
            api_key,
            directory,
            upload_mode,
        },
        sources: Provenance {
            storage_url: url_source,
            api_key: key_source,
            directory: dir_source,
            upload_mode: mode_source,
        },
    })
}

fn missing_storage_url() -> ConfigError {
    ConfigError::Missing {
        field: "map storage URL",
        flag: "--map-storage-url",
        env_key: KEY_STORAGE_URL,
        store: NON_SECRET_STORE,
    }
}

fn missing_api_key() -> ConfigError {
    ConfigError::Missing {
        field: "map storage API key",
        flag: "--map-storage-api-key",
        env_key: KEY_API_KEY,
        store: SECRET_STORE,
    }
}

fn resolve_storage_url(
    overrides: &Overrides,
    persisted: &PersistedSettings,
    probe: &dyn StorageProbe,
    prompter: &mut dyn Prompter,
    interactive: bool,
) -> Result<(String, FieldSource), ConfigError> {
    let candidate = non_empty(overrides.storage_url.as_deref())
        .map(|v| (v, FieldSource::Flag))
        .or_else(|| non_empty(persisted.storage_url.as_deref()).map(|v| (v, FieldSource::Store)));

    if let Some((raw, source)) = candidate {
        let url = normalize_storage_url(raw);
        match check_storage_url(&url, probe) {
            Ok(()) => {
                info!("Map storage URL is valid: {}", url);
                return Ok((url, source));
            }
            Err(e) if !interactive => return Err(ConfigError::Validation(e)),
            Err(e) => warn!("{}", e),
        }
    } else if !interactive {
        return Err(missing_storage_url());
    }

    // Unbounded on purpose: an operator is present to give a correct
    // value or abort the process.
    loop {
        let raw = prompter.read_line("Please enter your map storage URL", None)?;
        if raw.trim().is_empty() {
            warn!("A URL is required to upload your map");
            continue;
        }
        let url = normalize_storage_url(&raw);
        match check_storage_url(&url, probe) {
            Ok(()) => {
                info!("Map storage URL is valid: {}", url);
                return Ok((url, FieldSource::Prompt));
            }
            Err(e) => warn!("{}", e),
        }
    }
}

fn resolve_api_key(
    overrides: &Overrides,
    persisted: &PersistedSettings,
    prompter: &mut dyn Prompter,
    interactive: bool,
) -> Result<(String, FieldSource), ConfigError> {
    if let Some(key) = non_empty(overrides.api_key.as_deref()) {
        return Ok((key.to_string(), FieldSource::Flag));
    }
    if let Some(key) = non_empty(persisted.api_key.as_deref()) {
        info!("API key found in {}", SECRET_STORE);
        return Ok((key.to_string(), FieldSource::Store));
    }
    if !interactive {
        return Err(missing_api_key());
    }

    loop {
        let key = prompter.read_secret("Please enter your API key")?;
        let key = key.trim();
        if key.is_empty() {
            warn!("An API key is required to upload your map");
            continue;
        }
        info!("Using API key {}", mask_secret(key));
        return Ok((key.to_string(), FieldSource::Prompt));
    }
}

fn resolve_directory(
    overrides: &Overrides,
    persisted: &PersistedSettings,
    vcs_slug: Option<&str>,
    prompter: &mut dyn Prompter,
    interactive: bool,
) -> Result<(String, FieldSource), ConfigError> {
    // An explicitly empty flag value selects the remote root.
    if let Some(dir) = overrides.directory.as_deref() {
        return Ok((dir.trim().to_string(), FieldSource::Flag));
    }
    if let Some(dir) = non_empty(persisted.directory.as_deref()) {
        return Ok((dir.to_string(), FieldSource::Store));
    }

    let fallback = vcs_slug.unwrap_or(DEFAULT_DIRECTORY);
    if !interactive {
        return Ok((fallback.to_string(), FieldSource::Default));
    }

    let answer = prompter.read_line("Upload directory", Some(fallback))?;
    let directory = match answer.trim() {
        "" => fallback.to_string(),
        value => value.to_string(),
    };
    info!("Your map will be uploaded to the directory: {}", directory);
    Ok((directory, FieldSource::Prompt))
}

fn resolve_upload_mode(
    overrides: &Overrides,
    persisted: &PersistedSettings,
) -> (UploadMode, FieldSource) {
    if let Some(mode) = overrides.upload_mode {
        return (mode, FieldSource::Flag);
    }
    if let Some(raw) = non_empty(persisted.upload_mode.as_deref()) {
        match UploadMode::from_store_value(raw) {
            Some(mode) => return (mode, FieldSource::Store),
            None => warn!("Ignoring unknown UPLOAD_MODE value: {}", raw),
        }
    }
    (UploadMode::MapStorage, FieldSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::io;

    use crate::error::{ConfigError, ValidationError};

    /// Probe that replays a scripted sequence of responses and counts
    /// how many liveness requests were made.
    struct ScriptedProbe {
        responses: RefCell<VecDeque<Result<u16, String>>>,
        calls: Cell<usize>,
    }

    impl ScriptedProbe {
        fn new(responses: Vec<Result<u16, String>>) -> Self {
            ScriptedProbe {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }

        fn ok() -> Self {
            Self::new(vec![Ok(200)])
        }
    }

    impl StorageProbe for ScriptedProbe {
        fn ping(&self, _ping_url: &str) -> Result<u16, String> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected liveness request")
        }
    }

    /// Prompter fed with canned answers; panics on any unscripted read.
    struct ScriptedPrompter {
        lines: VecDeque<String>,
        secrets: VecDeque<String>,
    }

    impl ScriptedPrompter {
        fn new(lines: Vec<&str>, secrets: Vec<&str>) -> Self {
            ScriptedPrompter {
                lines: lines.into_iter().map(String::from).collect(),
                secrets: secrets.into_iter().map(String::from).collect(),
            }
        }

        fn silent() -> Self {
            Self::new(vec![], vec![])
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, _message: &str, _default: Option<&str>) -> io::Result<String> {
            Ok(self.lines.pop_front().expect("unexpected line prompt"))
        }

        fn read_secret(&mut self, _message: &str) -> io::Result<String> {
            Ok(self.secrets.pop_front().expect("unexpected secret prompt"))
        }
    }

    fn flags_all() -> Overrides {
        Overrides {
            storage_url: Some("https://store.example".to_string()),
            api_key: Some("abc123".to_string()),
            directory: Some("my-map".to_string()),
            upload_mode: Some(UploadMode::MapStorage),
        }
    }

    fn persisted_all() -> PersistedSettings {
        PersistedSettings {
            storage_url: Some("https://persisted.example/".to_string()),
            api_key: Some("persisted-key".to_string()),
            directory: Some("persisted-map".to_string()),
            upload_mode: Some("CUSTOM".to_string()),
        }
    }

    #[test]
    fn test_flags_win_over_persisted_without_prompting() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();

        let resolved = resolve(
            &flags_all(),
            &persisted_all(),
            None,
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(resolved.config.storage_url, "https://store.example/");
        assert_eq!(resolved.config.api_key, "abc123");
        assert_eq!(resolved.config.directory, "my-map");
        assert_eq!(resolved.config.upload_mode, UploadMode::MapStorage);
        assert_eq!(resolved.sources.storage_url, FieldSource::Flag);
        assert_eq!(resolved.sources.api_key, FieldSource::Flag);
        assert_eq!(resolved.sources.directory, FieldSource::Flag);
        assert_eq!(resolved.sources.upload_mode, FieldSource::Flag);
        assert!(!resolved.sources.any_fresh());
    }

    #[test]
    fn test_persisted_values_used_when_no_flags() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();

        let resolved = resolve(
            &Overrides::default(),
            &persisted_all(),
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();

        assert_eq!(resolved.config.storage_url, "https://persisted.example/");
        assert_eq!(resolved.config.api_key, "persisted-key");
        assert_eq!(resolved.config.upload_mode, UploadMode::Custom);
        assert_eq!(resolved.sources.storage_url, FieldSource::Store);
        assert_eq!(resolved.sources.upload_mode, FieldSource::Store);
    }

    #[test]
    fn test_legacy_persisted_url_with_upload_suffix_is_normalized() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let persisted = PersistedSettings {
            storage_url: Some("https://old.example/upload".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &Overrides::default(),
            &persisted,
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();
        assert_eq!(resolved.config.storage_url, "https://old.example/");
    }

    #[test]
    fn test_non_interactive_missing_url_fails() {
        let probe = ScriptedProbe::new(vec![]);
        let mut prompter = ScriptedPrompter::silent();

        let err = resolve(
            &Overrides::default(),
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap_err();

        match err {
            ConfigError::Missing { field, flag, .. } => {
                assert_eq!(field, "map storage URL");
                assert_eq!(flag, "--map-storage-url");
            }
            other => panic!("expected Missing, got {:?}", other),
        }
        assert_eq!(probe.calls.get(), 0, "no network call without a URL");
    }

    #[test]
    fn test_non_interactive_missing_api_key_fails() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let overrides = Overrides {
            storage_url: Some("https://store.example".to_string()),
            ..Default::default()
        };

        let err = resolve(
            &overrides,
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Missing {
                field: "map storage API key",
                ..
            }
        ));
    }

    #[test]
    fn test_non_interactive_failed_liveness_is_fatal() {
        let probe = ScriptedProbe::new(vec![Ok(403)]);
        let mut prompter = ScriptedPrompter::silent();

        let err = resolve(
            &flags_all(),
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::Forbidden { status: 403, .. })
        ));
    }

    #[test]
    fn test_interactive_url_retries_until_liveness_passes() {
        // Three rejected candidates (transport error, 404, 401), then a
        // valid one.
        let probe = ScriptedProbe::new(vec![
            Err("connection refused".to_string()),
            Ok(404),
            Ok(401),
            Ok(200),
        ]);
        let mut prompter = ScriptedPrompter::new(
            vec![
                "https://one.example",
                "https://two.example",
                "https://three.example",
                "https://four.example",
            ],
            vec!["prompted-key"],
        );

        let resolved = resolve(
            &Overrides {
                directory: Some("my-map".to_string()),
                ..Default::default()
            },
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(probe.calls.get(), 4);
        assert_eq!(resolved.config.storage_url, "https://four.example/");
        assert_eq!(resolved.sources.storage_url, FieldSource::Prompt);
        assert!(resolved.sources.any_fresh());
    }

    #[test]
    fn test_interactive_empty_url_reprompts_without_probing() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::new(
            vec!["", "   ", "https://store.example"],
            vec!["prompted-key"],
        );

        let resolved = resolve(
            &Overrides {
                directory: Some("my-map".to_string()),
                ..Default::default()
            },
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(probe.calls.get(), 1, "blank candidates must not be probed");
        assert_eq!(resolved.config.storage_url, "https://store.example/");
    }

    #[test]
    fn test_interactive_invalid_flag_url_falls_back_to_prompt() {
        let probe = ScriptedProbe::new(vec![Ok(404), Ok(200)]);
        let mut prompter =
            ScriptedPrompter::new(vec!["https://fixed.example"], vec!["prompted-key"]);
        let overrides = Overrides {
            storage_url: Some("https://typo.example".to_string()),
            directory: Some("my-map".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &overrides,
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(resolved.config.storage_url, "https://fixed.example/");
        assert_eq!(resolved.sources.storage_url, FieldSource::Prompt);
    }

    #[test]
    fn test_interactive_empty_api_key_reprompts() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::new(
            vec!["https://store.example"],
            vec!["", "  ", " real-key "],
        );

        let resolved = resolve(
            &Overrides {
                directory: Some("my-map".to_string()),
                ..Default::default()
            },
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(resolved.config.api_key, "real-key");
        assert_eq!(resolved.sources.api_key, FieldSource::Prompt);
    }

    #[test]
    fn test_directory_defaults_to_vcs_slug() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let overrides = Overrides {
            storage_url: Some("https://store.example".to_string()),
            api_key: Some("abc123".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &overrides,
            &PersistedSettings::default(),
            Some("acme-town"),
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();

        assert_eq!(resolved.config.directory, "acme-town");
        assert_eq!(resolved.sources.directory, FieldSource::Default);
    }

    #[test]
    fn test_directory_falls_back_to_fixed_default() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let overrides = Overrides {
            storage_url: Some("https://store.example".to_string()),
            api_key: Some("abc123".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &overrides,
            &PersistedSettings::default(),
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();

        assert_eq!(resolved.config.directory, DEFAULT_DIRECTORY);
    }

    #[test]
    fn test_interactive_directory_prompt_accepts_default() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::new(vec![""], vec![]);
        let overrides = Overrides {
            storage_url: Some("https://store.example".to_string()),
            api_key: Some("abc123".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &overrides,
            &PersistedSettings::default(),
            Some("acme-town"),
            &probe,
            &mut prompter,
            true,
        )
        .unwrap();

        assert_eq!(resolved.config.directory, "acme-town");
        assert_eq!(resolved.sources.directory, FieldSource::Prompt);
    }

    #[test]
    fn test_empty_directory_flag_selects_root() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let overrides = Overrides {
            storage_url: Some("https://store.example".to_string()),
            api_key: Some("abc123".to_string()),
            directory: Some(String::new()),
            ..Default::default()
        };

        let resolved = resolve(
            &overrides,
            &PersistedSettings::default(),
            Some("acme-town"),
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();

        assert_eq!(resolved.config.directory, "");
        assert_eq!(resolved.sources.directory, FieldSource::Flag);
    }

    #[test]
    fn test_unknown_persisted_upload_mode_falls_back() {
        let probe = ScriptedProbe::ok();
        let mut prompter = ScriptedPrompter::silent();
        let persisted = PersistedSettings {
            storage_url: Some("https://persisted.example/".to_string()),
            api_key: Some("key".to_string()),
            upload_mode: Some("FTP".to_string()),
            ..Default::default()
        };

        let resolved = resolve(
            &Overrides::default(),
            &persisted,
            None,
            &probe,
            &mut prompter,
            false,
        )
        .unwrap();

        assert_eq!(resolved.config.upload_mode, UploadMode::MapStorage);
        assert_eq!(resolved.sources.upload_mode, FieldSource::Default);
    }
}
