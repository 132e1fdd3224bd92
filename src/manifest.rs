//! Terratar manifest loading.
//!
//! Two document shapes are accepted and both keep manifest order:
//!
//! ```yaml
//! - name: vpc
//!   source: https://modules.example.com/vpc
//!   version: 1.4.0
//! ```
//!
//! ```yaml
//! vpc:
//!   source: https://modules.example.com/vpc
//!   version: 1.4.0
//! ```

use crate::types::{scalar_string, ModuleDescriptor};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "Terratar.yml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("specified config does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid manifest: {0}")]
    Shape(String),
}

#[derive(Debug, Default, Deserialize)]
struct ModuleBody {
    #[serde(default, deserialize_with = "scalar_string")]
    source: String,
    #[serde(default, deserialize_with = "scalar_string")]
    version: String,
}

pub fn load_manifest(path: &Path) -> Result<Vec<ModuleDescriptor>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    tracing::debug!("Reading manifest {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_manifest(&content)
}

pub fn parse_manifest(content: &str) -> Result<Vec<ModuleDescriptor>, ManifestError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(content)?;

    match document {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(_) => Ok(serde_yaml::from_value::<Vec<ModuleDescriptor>>(document)?),
        Value::Mapping(mapping) => {
            let mut modules = Vec::with_capacity(mapping.len());
            for (key, body) in mapping {
                let name = match key {
                    Value::String(name) => name,
                    other => {
                        return Err(ManifestError::Shape(format!(
                            "module names must be strings, found {:?}",
                            other
                        )))
                    }
                };
                let body: ModuleBody = if body.is_null() {
                    ModuleBody::default()
                } else {
                    serde_yaml::from_value(body)?
                };
                modules.push(ModuleDescriptor::new(name, body.source, body.version));
            }
            Ok(modules)
        }
        _ => Err(ManifestError::Shape(
            "expected a list of modules or a mapping of module names".to_string(),
        )),
    }
}
