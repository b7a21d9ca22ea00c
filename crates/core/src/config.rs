//! Configuration management for Clearance.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.clearance/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: persisted index snapshots, the
//! role-access table override and prompt overrides all live under `.clearance/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the answer generator factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 1] = ["ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .clearance/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Base directory holding one subdirectory per department
    pub data_dir: PathBuf,

    /// Answer generator provider (e.g., "ollama")
    pub provider: String,

    /// Answer generator model identifier
    pub model: String,

    /// Optional provider endpoint override
    pub endpoint: Option<String>,

    /// Request timeout for the answer generator, in seconds
    pub timeout_secs: Option<u64>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    workspace: Option<WorkspaceSection>,
    data: Option<DataSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataSection {
    dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            data_dir: workspace.join("data"),
            workspace,
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            timeout_secs: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `CLEARANCE_WORKSPACE`: Override workspace path
    /// - `CLEARANCE_CONFIG`: Path to config file
    /// - `CLEARANCE_DATA_DIR`: Department document root
    /// - `CLEARANCE_PROVIDER`: Answer generator provider
    /// - `CLEARANCE_MODEL`: Model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use clearance_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CLEARANCE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
            config.data_dir = config.workspace.join("data");
        }

        if let Ok(config_file) = std::env::var("CLEARANCE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.clearance_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(data_dir) = std::env::var("CLEARANCE_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(provider) = std::env::var("CLEARANCE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CLEARANCE_MODEL") {
            config.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(data) = config_file.data {
            if let Some(dir) = data.dir {
                let dir = PathBuf::from(dir);
                // Relative data directories are anchored at the workspace
                result.data_dir = if dir.is_absolute() {
                    dir
                } else {
                    result.workspace.join(dir)
                };
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if llm.timeout_secs.is_some() {
                result.timeout_secs = llm.timeout_secs;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .clearance directory.
    pub fn clearance_dir(&self) -> PathBuf {
        self.workspace.join(".clearance")
    }

    /// Ensure the .clearance directory exists.
    pub fn ensure_clearance_dir(&self) -> AppResult<()> {
        let dir = self.clearance_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .clearance directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "Provider endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(AppError::Config(
                "timeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert!(config.data_dir.ends_with("data"));
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_clearance_dir() {
        let config = AppConfig::default();
        assert!(config.clearance_dir().ends_with(".clearance"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some(PathBuf::from("/srv/docs")),
            None,
            Some("mistral".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "mistral");
        assert_eq!(overridden.data_dir, PathBuf::from("/srv/docs"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let base = AppConfig {
            workspace: PathBuf::from("/ws"),
            ..AppConfig::default()
        };
        let yaml = r#"
llm:
  model: phi3
  endpoint: http://gpu-box:11434
  timeoutSecs: 60
data:
  dir: company-docs
logging:
  level: warn
  color: false
"#;
        let merged = base.merge_yaml_str(yaml).unwrap();
        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "phi3");
        assert_eq!(merged.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(merged.timeout_secs, Some(60));
        assert_eq!(merged.data_dir, PathBuf::from("/ws/company-docs"));
        assert_eq!(merged.log_level.as_deref(), Some("warn"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_merge_yaml_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm:\n  model: qwen2\n").unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "qwen2");
    }

    #[test]
    fn test_merge_yaml_rejects_malformed_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [unclosed").unwrap();

        let err = AppConfig::default().merge_yaml(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_endpoint_scheme() {
        let config = AppConfig {
            endpoint: Some("localhost:11434".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            endpoint: Some("http://localhost:11434".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
