//! Configuration loading for lyapviz.
//!
//! The file is optional. A missing file means every section takes its
//! default, which reproduces the built-in example system.
//!
//! ```toml
//! [system]
//! f1 = "-x1**3"
//! f2 = "-x2"
//! v = "x1**2 + x2**2"
//! variables = ["x1", "x2"]
//!
//! [verifier]
//! domain_limit = 3.0
//! num_points = 40
//!
//! [visualizer]
//! limit = 3.0
//! resolution = 80
//!
//! [app]
//! ascii_only = false
//! high_contrast = false
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use lyapviz_types::StateVars;
use lyapviz_types::ui::UiOptions;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "LYAPVIZ_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LyapvizConfig {
    pub system: SystemConfig,
    pub verifier: VerifierConfig,
    pub visualizer: VisualizerConfig,
    pub app: AppConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// The dynamical system and candidate function to check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    pub f1: String,
    pub f2: String,
    pub v: String,
    pub variables: StateVars,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            f1: "-x1**3".to_string(),
            f2: "-x2".to_string(),
            v: "x1**2 + x2**2".to_string(),
            variables: StateVars::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Half-width of the sampled square.
    pub domain_limit: f64,
    /// Samples per axis, endpoints included.
    pub num_points: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            domain_limit: 3.0,
            num_points: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    pub limit: f64,
    pub resolution: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            limit: 3.0,
            resolution: 80,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for markers and gauges.
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    pub high_contrast: bool,
}

impl AppConfig {
    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        UiOptions {
            ascii_only: self.ascii_only,
            high_contrast: self.high_contrast,
        }
    }
}

impl LyapvizConfig {
    /// Load the config from [`config_path`].
    ///
    /// Returns `Ok(None)` when no path can be resolved or the file does not exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                Ok(Some(config))
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

/// `LYAPVIZ_CONFIG` if set and non-empty, else `~/.lyapviz/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_ENV) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => dirs::home_dir().map(|home| home.join(".lyapviz").join("config.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LyapvizConfig, SystemConfig};
    use lyapviz_types::StateVars;
    use std::path::PathBuf;

    #[test]
    fn empty_file_yields_defaults() {
        let config: LyapvizConfig = toml::from_str("").unwrap();
        assert_eq!(config, LyapvizConfig::default());
        assert_eq!(config.system.f1, "-x1**3");
        assert_eq!(config.system.f2, "-x2");
        assert_eq!(config.system.v, "x1**2 + x2**2");
        assert_eq!(config.verifier.num_points, 40);
        assert_eq!(config.visualizer.resolution, 80);
        assert!(!config.app.ascii_only);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: LyapvizConfig = toml::from_str(
            r#"
[system]
f1 = "x1"

[visualizer]
resolution = 40
"#,
        )
        .unwrap();
        assert_eq!(config.system.f1, "x1");
        assert_eq!(config.system.f2, SystemConfig::default().f2);
        assert_eq!(config.visualizer.resolution, 40);
        assert_eq!(config.visualizer.limit, 3.0);
        assert_eq!(config.verifier.domain_limit, 3.0);
    }

    #[test]
    fn custom_variables_are_validated() {
        let config: LyapvizConfig = toml::from_str(
            r#"
[system]
f1 = "omega"
f2 = "-sin(theta)"
v = "theta**2 + omega**2"
variables = ["theta", "omega"]
"#,
        )
        .unwrap();
        assert_eq!(
            config.system.variables,
            StateVars::new("theta", "omega").unwrap()
        );

        let duplicate = toml::from_str::<LyapvizConfig>("[system]\nvariables = [\"a\", \"a\"]\n");
        assert!(duplicate.is_err());
        let too_many = toml::from_str::<LyapvizConfig>("[system]\nvariables = [\"a\", \"b\", \"c\"]\n");
        assert!(too_many.is_err());
    }

    #[test]
    fn app_section_maps_to_ui_options() {
        let config: LyapvizConfig =
            toml::from_str("[app]\nascii_only = true\nhigh_contrast = true\n").unwrap();
        let options = config.app.ui_options();
        assert!(options.ascii_only);
        assert!(options.high_contrast);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<LyapvizConfig>("[verifier]\npoints = 10\n").is_err());
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LyapvizConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[verifier]\nnum_points = 12\n").unwrap();
        let loaded = LyapvizConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.verifier.num_points, 12);
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "invalid toml [").unwrap();
        let err = LyapvizConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn config_error_path_accessor() {
        let path = PathBuf::from("/test/path");
        let err = ConfigError::Read {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.path(), path.as_path());
    }
}
