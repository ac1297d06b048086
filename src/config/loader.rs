// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, environment overrides

use crate::config::{constants::paths, ExperimentConfig};
use crate::utils::validation::ValidationError;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SECTIONS: [&str; 4] = ["experiment", "grid", "signal", "logging"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", format_validation_errors(.0))]
    ValidationError(Vec<ValidationError>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}", e))
        .collect::<String>()
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Merges built-in defaults, each existing file on the search path (later
/// files win), then `BIOSIG_<SECTION>_<KEY>` environment variables.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader over the default search path
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader over explicit paths, in increasing precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> Result<ExperimentConfig, ConfigError> {
        let mut merged = toml::Value::try_from(&ExperimentConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            match self.load_config_file(config_path) {
                Ok(file_config) => {
                    tracing::debug!(path = %config_path.display(), "Merging configuration file");
                    merge_toml_values(&mut merged, file_config);
                }
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged);

        let config: ExperimentConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Validate a single file on top of the defaults without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: ExperimentConfig = toml::from_str(&content)?;
        config.validate().map_err(ConfigError::ValidationError)
    }

    /// Write `config` as pretty TOML
    pub fn export_config<P: AsRef<Path>>(
        &self,
        config: &ExperimentConfig,
        path: P,
    ) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_config_file(&self, path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars_os() {
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                continue;
            };
            let Some(rest) = key.strip_prefix(self.env_prefix.as_str()) else {
                continue;
            };
            let rest = rest.to_lowercase();
            let Some((section, field)) = rest.split_once('_') else {
                continue;
            };
            if !SECTIONS.contains(&section) || field.is_empty() {
                continue;
            }

            tracing::debug!(variable = %key, "Applying environment override");
            set_nested_value(config, section, field, parse_env_value(value));
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::PROJECT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Parse as a TOML value (numbers, booleans, arrays, quoted strings), else a bare string
fn parse_env_value(value: &str) -> toml::Value {
    let wrapped = format!("v = {}", value);
    toml::from_str::<toml::Table>(&wrapped)
        .ok()
        .and_then(|mut table| table.remove("v"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()))
}

fn set_nested_value(config: &mut toml::Value, section: &str, field: &str, value: toml::Value) {
    if let toml::Value::Table(root) = config {
        let entry = root
            .entry(section.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(table) = entry {
            table.insert(field.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", contents).unwrap();
        temp_file
    }

    #[test]
    fn test_config_loader_creation() {
        let loader = ConfigLoader::new();
        assert_eq!(loader.config_paths().len(), 3);
    }

    #[test]
    #[serial]
    fn test_load_without_files_gives_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/biosignal.toml")]);
        let config = loader.load().unwrap();
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    #[serial]
    fn test_later_files_take_precedence() {
        let base = write_config(
            r#"
[experiment]
max_steps = 20
risk_tau = 0.5
"#,
        );
        let local = write_config(
            r#"
[experiment]
max_steps = 30
"#,
        );

        let loader = ConfigLoader::with_paths(vec![base.path().into(), local.path().into()]);
        let config = loader.load().unwrap();

        assert_eq!(config.experiment.max_steps, 30);
        assert_eq!(config.experiment.risk_tau, 0.5);
    }

    #[test]
    fn test_config_file_validation() {
        let loader = ConfigLoader::new();
        let temp_file = write_config(
            r#"
[grid]
latencies = [0.0, 0.5]
missing_rates = [0.1]
"#,
        );

        assert!(loader.validate_config_file(temp_file.path()).is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let loader = ConfigLoader::new();
        let temp_file = write_config(
            r#"
[grid]
missing_rates = [1.5]  # Not a probability
"#,
        );

        match loader.validate_config_file(temp_file.path()) {
            Err(ConfigError::ValidationError(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let loader = ConfigLoader::new();
        let temp_file = write_config("[grid\nlatencies = ");
        assert!(matches!(
            loader.validate_config_file(temp_file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        std::env::set_var("BIOSIG_EXPERIMENT_MAX_STEPS", "42");
        std::env::set_var("BIOSIG_GRID_NOISE_STDS", "[0.0, 0.3]");
        std::env::set_var("BIOSIG_SIGNAL_MISSING_POLICY", "hold_last");

        let loader = ConfigLoader::with_paths(Vec::new());
        let config = loader.load();

        std::env::remove_var("BIOSIG_EXPERIMENT_MAX_STEPS");
        std::env::remove_var("BIOSIG_GRID_NOISE_STDS");
        std::env::remove_var("BIOSIG_SIGNAL_MISSING_POLICY");

        let config = config.unwrap();
        assert_eq!(config.experiment.max_steps, 42);
        assert_eq!(config.grid.noise_stds, vec![0.0, 0.3]);
        assert_eq!(
            config.signal.missing_policy,
            crate::degradation::MissingPolicy::HoldLast
        );
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_non_unicode_environment_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad_value_key = "BIOSIG_EXPERIMENT_RESULT_DIR";
        let bad_key = OsStr::from_bytes(b"BIOSIG_GRID_\xFF");
        std::env::set_var(bad_value_key, OsStr::from_bytes(b"out\xFF"));
        std::env::set_var(bad_key, "1");
        std::env::set_var("BIOSIG_EXPERIMENT_MAX_STEPS", "9");

        let config = ConfigLoader::with_paths(Vec::new()).load();

        std::env::remove_var(bad_value_key);
        std::env::remove_var(bad_key);
        std::env::remove_var("BIOSIG_EXPERIMENT_MAX_STEPS");

        let config = config.unwrap();
        assert_eq!(config.experiment.max_steps, 9);
        assert_eq!(
            config.experiment.result_dir,
            ExperimentConfig::default().experiment.result_dir
        );
    }

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value("4"), toml::Value::Integer(4));
        assert_eq!(parse_env_value("0.25"), toml::Value::Float(0.25));
        assert_eq!(parse_env_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_env_value("Town03"), toml::Value::String("Town03".into()));
    }

    #[test]
    fn test_config_export_round_trip() {
        let loader = ConfigLoader::new();
        let temp_file = NamedTempFile::new().unwrap();

        let mut config = ExperimentConfig::default();
        config.experiment.seed = Some(99);
        loader.export_config(&config, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[experiment]"));
        assert!(content.contains("[grid]"));

        let reloaded: ExperimentConfig = toml::from_str(&content).unwrap();
        assert_eq!(reloaded, config);
    }
}
