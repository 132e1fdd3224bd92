use crate::cli::Cli;
use crate::manifest::MANIFEST_FILE_NAME;
use crate::types::InstallSettings;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const VENDOR_DIR_NAME: &str = ".vendor";
pub const MODULES_DIR_NAME: &str = "modules";

pub const ENV_MANIFEST_FILE: &str = "TERRATAR_FILE";
pub const ENV_MODULE_PATH: &str = "TERRATAR_MODULE_PATH";
pub const ENV_OVERWRITE: &str = "TERRATAR_OVERWRITE";

/// Everything a run needs, resolved before any module is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub manifest_path: PathBuf,
    pub install: InstallSettings,
    pub timeout: Option<Duration>,
}

pub fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let working_dir = env::current_dir().context("Could not determine working directory")?;
    Ok(resolve_config_in(cli, &working_dir, |key| env::var(key).ok()))
}

/// Resolve paths and flags with precedence flag > environment > default.
///
/// Relative paths are taken from `working_dir`. Without an explicit module
/// path, modules go to `.vendor/modules` next to the manifest.
pub fn resolve_config_in<F>(cli: &Cli, working_dir: &Path, env_var: F) -> RunConfig
where
    F: Fn(&str) -> Option<String>,
{
    let manifest_path = cli
        .terratar_file
        .clone()
        .or_else(|| env_var(ENV_MANIFEST_FILE).map(PathBuf::from))
        .map(|path| absolute(working_dir, &path))
        .unwrap_or_else(|| working_dir.join(MANIFEST_FILE_NAME));
    tracing::debug!("Manifest path: {}", manifest_path.display());

    let install_root = cli
        .module_path
        .clone()
        .or_else(|| env_var(ENV_MODULE_PATH).map(PathBuf::from))
        .map(|path| absolute(working_dir, &path))
        .unwrap_or_else(|| {
            manifest_path
                .parent()
                .unwrap_or(working_dir)
                .join(VENDOR_DIR_NAME)
                .join(MODULES_DIR_NAME)
        });
    tracing::debug!("Module install directory: {}", install_root.display());

    let overwrite = cli.overwrite || env_var(ENV_OVERWRITE).is_some_and(|v| is_truthy(&v));

    RunConfig {
        manifest_path,
        install: InstallSettings {
            overwrite,
            strict_validation: !cli.lenient,
            ..InstallSettings::new(install_root)
        },
        timeout: cli.timeout.map(Duration::from_secs),
    }
}

fn absolute(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
