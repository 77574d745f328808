//! Class Registry
//!
//! Ordered, read-only list of class labels, loaded once at startup and shared
//! by every request.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::CLASS_NAMES;
use crate::utils::error::{Error, Result};

/// Where the class labels come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassSource {
    /// Newline-separated label list; fatal if set and unreadable
    pub file: Option<PathBuf>,
    /// Dataset split whose sub-directories name the classes
    pub directory: Option<PathBuf>,
}

/// Ordered list of class labels addressed by model output index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Build a registry from labels, rejecting empty or duplicate names
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(Error::Classes("empty class name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Classes(format!("duplicate class name '{}'", name)));
            }
        }
        Ok(Self { names })
    }

    /// A registry with no classes; predictions against it report
    /// "Class names not loaded".
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// The built-in PlantVillage labels in training order
    pub fn builtin() -> Self {
        Self {
            names: CLASS_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Load class names from the sub-directories of a dataset split.
    ///
    /// Names are sorted, matching the label indices assigned at training time.
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::PathNotFound(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let file_name = entry.file_name();
                let name = file_name.to_str().ok_or_else(|| {
                    Error::Classes(format!(
                        "class directory name is not valid UTF-8: {:?}",
                        file_name
                    ))
                })?;
                names.push(name.to_string());
            }
        }
        names.sort();

        if names.is_empty() {
            return Err(Error::Classes(format!(
                "no class directories found in {}",
                dir.display()
            )));
        }

        Self::new(names)
    }

    /// Load class names from a newline-separated file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Classes(format!("failed to read {}: {}", path.display(), e))
        })?;

        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(Error::Classes(format!("{} lists no classes", path.display())));
        }

        Self::new(names)
    }

    /// Resolve the registry: label file, then dataset directory, then the
    /// built-in list.
    pub fn load(source: &ClassSource) -> Result<Self> {
        if let Some(file) = &source.file {
            let registry = Self::from_file(file)?;
            info!("Loaded {} class names from {:?}", registry.len(), file);
            return Ok(registry);
        }

        if let Some(dir) = &source.directory {
            if dir.exists() {
                let registry = Self::from_directory(dir)?;
                info!("Loaded {} class names from dataset {:?}", registry.len(), dir);
                return Ok(registry);
            }
            warn!("Dataset directory {:?} not found", dir);
        }

        warn!("Using built-in class names");
        Ok(Self::builtin())
    }

    /// Label at a model output index
    pub fn name_at(&self, index: usize) -> Result<&str> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(Error::ClassIndexOutOfRange {
                index,
                len: self.names.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
