//! Server configuration
//!
//! Defaults, optionally overridden by a TOML file, then by CLI flags and
//! environment variables (see `main.rs`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::ClassSource;
use crate::inference::PreprocessConfig;
use crate::model::ModelSource;
use crate::utils::error::{Error, Result};
use crate::utils::logging::LogLevel;
use crate::IMAGE_SIZE;

/// Default port, overridable with `PORT`
pub const DEFAULT_PORT: u16 = 8000;

/// Maximum accepted upload size (16 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Trained model artifact
    pub model_path: PathBuf,
    /// Alternate artifact tried when the primary fails to load
    pub fallback_model_path: Option<PathBuf>,
    /// Dataset split whose sub-directories name the classes
    pub classes_dir: Option<PathBuf>,
    /// Newline-separated class list, takes precedence over `classes_dir`
    pub classes_file: Option<PathBuf>,
    /// Origins allowed to call the API; `*` allows any
    pub allowed_origins: Vec<String>,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
    /// Square input size expected by the model
    pub image_size: u32,
    /// Log level
    pub log_level: LogLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from("trained_plant_disease_model"),
            fallback_model_path: Some(PathBuf::from("trained_plant_disease_model-1")),
            classes_dir: Some(PathBuf::from("Dataset/valid")),
            classes_file: None,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
                "http://localhost:5175".to_string(),
                "http://localhost:3000".to_string(),
                "*".to_string(),
            ],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            image_size: IMAGE_SIZE,
            log_level: LogLevel::Info,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config {}: {e}", path.display())))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(Error::Config("image_size must be positive".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be positive".to_string()));
        }
        if self.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(Error::Config("allowed_origins contains an empty entry".to_string()));
        }
        Ok(())
    }

    pub fn model_source(&self) -> ModelSource {
        ModelSource {
            path: self.model_path.clone(),
            fallback_path: self.fallback_model_path.clone(),
        }
    }

    pub fn class_source(&self) -> ClassSource {
        ClassSource {
            file: self.classes_file.clone(),
            directory: self.classes_dir.clone(),
        }
    }

    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig::square(self.image_size)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.image_size, 128);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert!(config.allows_any_origin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server.toml");
        fs::write(
            &path,
            r#"
port = 9000
classes_file = "classes.txt"
allowed_origins = ["https://example.org"]
log_level = "debug"
"#,
        )
        .unwrap();

        let config = ServerConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.classes_file, Some(PathBuf::from("classes.txt")));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.allows_any_origin());
        // untouched keys keep defaults
        assert_eq!(config.image_size, 128);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(matches!(
            ServerConfig::from_toml_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate() {
        let config = ServerConfig {
            image_size: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_upload_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sources() {
        let config = ServerConfig::default();
        let model = config.model_source();
        assert_eq!(model.path, PathBuf::from("trained_plant_disease_model"));
        assert!(model.fallback_path.is_some());

        let classes = config.class_source();
        assert!(classes.file.is_none());
        assert_eq!(classes.directory, Some(PathBuf::from("Dataset/valid")));
    }
}
