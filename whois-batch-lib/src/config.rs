//! Configuration file parsing, environment variables and settings merging.
//!
//! Settings are resolved with this precedence (highest first):
//!
//! 1. CLI arguments (applied by the binary)
//! 2. `WB_*` environment variables
//! 3. TOML config file (explicit path, or discovered local/global/XDG file)
//! 4. Built-in defaults

use crate::error::WhoisBatchError;
use crate::export::ExportFormat;
use crate::types::BatchConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Default input file with one name per line.
pub const DEFAULT_INPUT_FILE: &str = "domains.txt";

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Input file with names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Suffixes to check, e.g. `["cz", ".com"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<Vec<String>>,

    /// Worker count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Minimum delay between WHOIS calls, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,

    /// CSV output path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,

    /// Disable CSV output entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_csv: Option<bool>,

    /// JSON output path (disabled when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,

    /// HTML output path (disabled when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Colored console output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Only print and export free domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_free: Option<bool>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisBatchError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WhoisBatchError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisBatchError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Discover and merge configuration files.
    ///
    /// XDG config has the lowest precedence, then the home directory file,
    /// then a file in the current directory. Files that fail to load are
    /// skipped with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged = self.merge_configs(merged, config),
                Err(e) => warn!("ignoring config file {}: {}", path.display(), e),
            }
        }

        merged
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-batch.toml", "./.whois-batch.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-batch.toml", "whois-batch.toml"]
            .into_iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-batch").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        let defaults = match (lower.defaults, higher.defaults) {
            (Some(lower), Some(higher)) => Some(DefaultsConfig {
                file: higher.file.or(lower.file),
                suffixes: higher.suffixes.or(lower.suffixes),
                threads: higher.threads.or(lower.threads),
                delay: higher.delay.or(lower.delay),
                csv: higher.csv.or(lower.csv),
                no_csv: higher.no_csv.or(lower.no_csv),
                json: higher.json.or(lower.json),
                html: higher.html.or(lower.html),
                color: higher.color.or(lower.color),
                only_free: higher.only_free.or(lower.only_free),
            }),
            (lower, higher) => higher.or(lower),
        };

        FileConfig { defaults }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisBatchError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(delay) = defaults.delay {
            validate_delay(delay)?;
        }

        if let Some(suffixes) = &defaults.suffixes {
            if suffixes.iter().all(|s| s.trim().trim_start_matches('.').is_empty()) {
                return Err(WhoisBatchError::config(
                    "'suffixes' in config must contain at least one suffix",
                ));
            }
        }

        Ok(())
    }
}

/// Check a delay can be used as a rate-limit interval.
///
/// Zero or negative delays are accepted and disable rate limiting. NaN,
/// infinity and values too large for a `Duration` are rejected.
pub fn validate_delay(delay: f64) -> Result<(), WhoisBatchError> {
    let representable = delay <= 0.0 || Duration::try_from_secs_f64(delay).is_ok();
    if !delay.is_finite() || !representable {
        return Err(WhoisBatchError::config(format!(
            "Delay must be a finite number of seconds, got {}",
            delay
        )));
    }
    Ok(())
}

/// Configuration values taken from `WB_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub file: Option<String>,
    pub suffixes: Option<String>,
    pub threads: Option<usize>,
    pub delay: Option<f64>,
    /// `Some(None)` means the output was explicitly disabled
    pub csv: Option<Option<PathBuf>>,
    pub json: Option<Option<PathBuf>>,
    pub html: Option<Option<PathBuf>>,
    pub no_color: Option<bool>,
    pub only_free: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|key| env::var(key).ok())
}

impl EnvConfig {
    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EnvConfig::default();

        // WB_FILE - input file with names
        if let Some(file) = get("WB_FILE").filter(|v| !v.trim().is_empty()) {
            config.file = Some(file);
        }

        // WB_SUFFIXES - comma or space separated suffixes
        if let Some(suffixes) = get("WB_SUFFIXES").filter(|v| !v.trim().is_empty()) {
            config.suffixes = Some(suffixes);
        }

        // WB_THREADS - worker count
        if let Some(val) = get("WB_THREADS") {
            match val.trim().parse::<usize>() {
                Ok(threads) => config.threads = Some(threads),
                Err(_) => warn!("Invalid WB_THREADS='{}', must be a whole number", val),
            }
        }

        // WB_DELAY - seconds between WHOIS calls
        if let Some(val) = get("WB_DELAY") {
            match val.trim().parse::<f64>() {
                Ok(delay) if validate_delay(delay).is_ok() => config.delay = Some(delay),
                _ => warn!("Invalid WB_DELAY='{}', must be a finite number of seconds", val),
            }
        }

        // WB_CSV / WB_JSON / WB_HTML - output path, or true/false
        config.csv = get("WB_CSV").map(|v| parse_output_target(&v, ExportFormat::Csv));
        config.json = get("WB_JSON").map(|v| parse_output_target(&v, ExportFormat::Json));
        config.html = get("WB_HTML").map(|v| parse_output_target(&v, ExportFormat::Html));

        for (key, slot) in [
            ("WB_NO_COLOR", &mut config.no_color),
            ("WB_ONLY_FREE", &mut config.only_free),
        ] {
            if let Some(val) = get(key) {
                match parse_bool(&val) {
                    Some(flag) => *slot = Some(flag),
                    None => warn!("Invalid {}='{}', use true/false", key, val),
                }
            }
        }

        // WB_CONFIG - explicit config file
        if let Some(path) = get("WB_CONFIG").filter(|v| !v.trim().is_empty()) {
            config.config = Some(path);
        }

        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Interpret an output setting: a boolean toggles the format's default
/// path, an empty value disables it, anything else is a path.
fn parse_output_target(value: &str, format: ExportFormat) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    match parse_bool(trimmed) {
        Some(true) => Some(PathBuf::from(format.default_path())),
        Some(false) => None,
        None => Some(PathBuf::from(trimmed)),
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub file: PathBuf,
    /// Raw suffix list, normalized later with [`parse_suffixes`](crate::parse_suffixes)
    pub suffixes: Option<String>,
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub threads: usize,
    pub delay: f64,
    pub color: bool,
    pub only_free: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_INPUT_FILE),
            suffixes: None,
            csv: Some(PathBuf::from(ExportFormat::Csv.default_path())),
            json: None,
            html: None,
            threads: 10,
            delay: 0.5,
            color: true,
            only_free: false,
        }
    }
}

impl Settings {
    /// Apply values from a config file.
    pub fn apply_file_config(&mut self, file_config: FileConfig) {
        let Some(defaults) = file_config.defaults else {
            return;
        };

        if let Some(file) = defaults.file {
            self.file = PathBuf::from(file);
        }
        if let Some(suffixes) = defaults.suffixes {
            self.suffixes = Some(suffixes.join(" "));
        }
        if let Some(threads) = defaults.threads {
            self.threads = threads;
        }
        if let Some(delay) = defaults.delay {
            self.delay = delay;
        }
        if let Some(csv) = defaults.csv {
            self.csv = Some(PathBuf::from(csv));
        }
        if defaults.no_csv == Some(true) {
            self.csv = None;
        }
        if let Some(json) = defaults.json {
            self.json = Some(PathBuf::from(json));
        }
        if let Some(html) = defaults.html {
            self.html = Some(PathBuf::from(html));
        }
        if let Some(color) = defaults.color {
            self.color = color;
        }
        if let Some(only_free) = defaults.only_free {
            self.only_free = only_free;
        }
    }

    /// Apply values from `WB_*` environment variables.
    pub fn apply_env_config(&mut self, env_config: &EnvConfig) {
        if let Some(file) = &env_config.file {
            self.file = PathBuf::from(file);
        }
        if let Some(suffixes) = &env_config.suffixes {
            self.suffixes = Some(suffixes.clone());
        }
        if let Some(threads) = env_config.threads {
            self.threads = threads;
        }
        if let Some(delay) = env_config.delay {
            self.delay = delay;
        }
        if let Some(csv) = &env_config.csv {
            self.csv = csv.clone();
        }
        if let Some(json) = &env_config.json {
            self.json = json.clone();
        }
        if let Some(html) = &env_config.html {
            self.html = html.clone();
        }
        if let Some(no_color) = env_config.no_color {
            self.color = !no_color;
        }
        if let Some(only_free) = env_config.only_free {
            self.only_free = only_free;
        }
    }

    /// Reject delays that cannot be turned into an interval.
    ///
    /// Thread counts are never an error; [`batch_config`](Self::batch_config)
    /// clamps them to 1-100.
    pub fn validate(&self) -> Result<(), WhoisBatchError> {
        validate_delay(self.delay)
    }

    /// Engine configuration derived from these settings.
    pub fn batch_config(&self) -> BatchConfig {
        if !(1..=100).contains(&self.threads) {
            warn!(threads = self.threads, "thread count clamped to 1-100");
        }
        BatchConfig::default()
            .with_threads(self.threads)
            .with_delay_secs(self.delay)
            .with_only_free(self.only_free)
    }

    /// Enabled export targets, in the order they are written.
    pub fn export_targets(&self) -> Vec<(ExportFormat, PathBuf)> {
        [
            (ExportFormat::Csv, &self.csv),
            (ExportFormat::Json, &self.json),
            (ExportFormat::Html, &self.html),
        ]
        .into_iter()
        .filter_map(|(format, path)| path.clone().map(|p| (format, p)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    fn env_from(pairs: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[defaults]
file = "names.txt"
suffixes = ["cz", ".com"]
threads = 4
delay = 1.5
json = "out.json"
only_free = true
"#,
        );

        let config = ConfigManager::new().load_file(file.path()).unwrap();
        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.file.as_deref(), Some("names.txt"));
        assert_eq!(defaults.suffixes, Some(vec!["cz".to_string(), ".com".to_string()]));
        assert_eq!(defaults.threads, Some(4));
        assert_eq!(defaults.delay, Some(1.5));
        assert_eq!(defaults.json.as_deref(), Some("out.json"));
        assert_eq!(defaults.only_free, Some(true));
        assert_eq!(defaults.html, None);
    }

    #[test]
    fn test_out_of_range_threads_accepted() {
        let file = write_config("[defaults]\nthreads = 0\n");
        let config = ConfigManager::new().load_file(file.path()).unwrap();
        assert_eq!(config.defaults.unwrap().threads, Some(0));

        let file = write_config("[defaults]\nthreads = 500\n");
        assert!(ConfigManager::new().load_file(file.path()).is_ok());
    }

    #[test]
    fn test_negative_delay_accepted() {
        let file = write_config("[defaults]\ndelay = -0.5\n");
        assert!(ConfigManager::new().load_file(file.path()).is_ok());
    }

    #[test]
    fn test_unusable_delay_rejected() {
        for delay in ["nan", "inf", "1e20"] {
            let file = write_config(&format!("[defaults]\ndelay = {}\n", delay));
            let err = ConfigManager::new().load_file(file.path()).unwrap_err();
            assert!(err.to_string().contains("Delay"), "delay = {}", delay);
        }
    }

    #[test]
    fn test_huge_delay_is_config_error_not_panic() {
        let settings = Settings {
            delay: 1e20,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(WhoisBatchError::ConfigError { .. })
        ));
        assert!(validate_delay(f64::NAN).is_err());
        assert!(validate_delay(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        for (threads, expected) in [(0, 1), (200, 100), (7, 7)] {
            let settings = Settings {
                threads,
                delay: -1.0,
                ..Default::default()
            };
            assert!(settings.validate().is_ok());

            let batch = settings.batch_config();
            assert_eq!(batch.threads, expected);
            assert_eq!(batch.delay, Duration::ZERO);
        }
    }

    #[test]
    fn test_empty_suffix_list_rejected() {
        let file = write_config("[defaults]\nsuffixes = [\" \", \".\"]\n");
        assert!(ConfigManager::new().load_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let file = write_config("[defaults\nthreads = 3");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, WhoisBatchError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = ConfigManager::new()
            .load_file("/no/such/whois-batch.toml")
            .unwrap_err();
        assert!(matches!(err, WhoisBatchError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(10),
                delay: Some(2.0),
                color: Some(false),
                ..Default::default()
            }),
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(25),
                only_free: Some(true),
                ..Default::default()
            }),
        };

        let defaults = manager.merge_configs(lower, higher).defaults.unwrap();
        assert_eq!(defaults.threads, Some(25)); // Higher wins
        assert_eq!(defaults.delay, Some(2.0)); // Lower preserved
        assert_eq!(defaults.color, Some(false));
        assert_eq!(defaults.only_free, Some(true));
    }

    #[test]
    fn test_env_config_parsing() {
        let env = env_from(&[
            ("WB_FILE", "list.txt"),
            ("WB_SUFFIXES", "cz,com"),
            ("WB_THREADS", "5"),
            ("WB_DELAY", "0.25"),
            ("WB_CSV", "off"),
            ("WB_JSON", "true"),
            ("WB_HTML", "report.html"),
            ("WB_NO_COLOR", "1"),
            ("WB_ONLY_FREE", "yes"),
        ]);

        assert_eq!(env.file.as_deref(), Some("list.txt"));
        assert_eq!(env.suffixes.as_deref(), Some("cz,com"));
        assert_eq!(env.threads, Some(5));
        assert_eq!(env.delay, Some(0.25));
        assert_eq!(env.csv, Some(None));
        assert_eq!(env.json, Some(Some(PathBuf::from("results.json"))));
        assert_eq!(env.html, Some(Some(PathBuf::from("report.html"))));
        assert_eq!(env.no_color, Some(true));
        assert_eq!(env.only_free, Some(true));
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let env = env_from(&[
            ("WB_THREADS", "abc"),
            ("WB_DELAY", "soon"),
            ("WB_ONLY_FREE", "maybe"),
        ]);
        assert_eq!(env, EnvConfig::default());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.file, PathBuf::from("domains.txt"));
        assert_eq!(settings.csv, Some(PathBuf::from("results.csv")));
        assert_eq!(settings.json, None);
        assert_eq!(settings.html, None);
        assert_eq!(settings.threads, 10);
        assert_eq!(settings.delay, 0.5);
        assert!(settings.color);
        assert!(!settings.only_free);
    }

    #[test]
    fn test_env_overrides_file_config() {
        let mut settings = Settings::default();
        settings.apply_file_config(FileConfig {
            defaults: Some(DefaultsConfig {
                suffixes: Some(vec!["cz".to_string(), "sk".to_string()]),
                threads: Some(3),
                no_csv: Some(true),
                ..Default::default()
            }),
        });
        assert_eq!(settings.suffixes.as_deref(), Some("cz sk"));
        assert_eq!(settings.csv, None);

        settings.apply_env_config(&env_from(&[("WB_THREADS", "7"), ("WB_CSV", "mine.csv")]));
        assert_eq!(settings.threads, 7);
        assert_eq!(settings.csv, Some(PathBuf::from("mine.csv")));
        assert_eq!(settings.suffixes.as_deref(), Some("cz sk"));
    }

    #[test]
    fn test_batch_config_and_export_targets() {
        let settings = Settings {
            html: Some(PathBuf::from("r.html")),
            delay: 0.2,
            only_free: true,
            ..Default::default()
        };

        let batch = settings.batch_config();
        assert_eq!(batch.delay, Duration::from_millis(200));
        assert!(batch.only_free);

        let targets = settings.export_targets();
        assert_eq!(
            targets,
            vec![
                (ExportFormat::Csv, PathBuf::from("results.csv")),
                (ExportFormat::Html, PathBuf::from("r.html")),
            ]
        );
    }
}
