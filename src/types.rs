use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One module entry from the manifest.
///
/// Fields default to empty strings so a missing key surfaces as an invalid
/// descriptor at install time rather than as a manifest parse error.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct ModuleDescriptor {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub source: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
}

/// Accept any YAML scalar as a string, so `version: 2` reads as `"2"`.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a string, found {:?}", other))),
    }
}

impl ModuleDescriptor {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            version: version.into(),
        }
    }
}

/// Settings shared by every module of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    pub install_root: PathBuf,
    pub overwrite: bool,
    pub strict_validation: bool,
}

impl InstallSettings {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            overwrite: false,
            strict_validation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Installed,
    Skipped,
    Failed { reason: String },
}

impl Outcome {
    pub fn failed(reason: impl fmt::Display) -> Self {
        Outcome::Failed {
            reason: reason.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Installed => write!(f, "installed"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}
