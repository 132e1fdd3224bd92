use crate::download::{archive_url, ArchiveSource};
use crate::extract::extract;
use crate::types::{InstallSettings, ModuleDescriptor, ModuleReport, Outcome};
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid {field} for module '{name}'")]
    InvalidDescriptor { name: String, field: &'static str },
}

/// Installs manifest modules one after another into the install root.
pub struct Installer<S> {
    source: S,
    settings: InstallSettings,
}

impl<S: ArchiveSource> Installer<S> {
    pub fn new(source: S, settings: InstallSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &InstallSettings {
        &self.settings
    }

    /// Process every module in manifest order and report what happened to each.
    ///
    /// Download and extraction failures are recorded and the run moves on. An
    /// invalid descriptor stops the whole run unless strict validation is off.
    pub fn install_all(
        &self,
        modules: &[ModuleDescriptor],
    ) -> Result<Vec<ModuleReport>, InstallError> {
        let mut reports = Vec::with_capacity(modules.len());

        for module in modules {
            let span = tracing::info_span!("module", name = %module.name);
            let _guard = span.enter();

            let outcome = self.install_module(module)?;
            reports.push(ModuleReport {
                name: module.name.clone(),
                outcome,
            });
        }

        Ok(reports)
    }

    pub fn install_module(&self, module: &ModuleDescriptor) -> Result<Outcome, InstallError> {
        if !is_plain_relative(&module.name) {
            return self.invalid(module, "name");
        }

        let target = self.settings.install_root.join(&module.name);

        if self.settings.overwrite {
            if target.exists() {
                tracing::info!("Overriding existing module at {}", target.display());
            }
        } else if target.exists() {
            tracing::info!(
                "Module already exists at {}, skipping...",
                target.display()
            );
            return Ok(Outcome::Skipped);
        }

        if module.source.is_empty() {
            return self.invalid(module, "source");
        }
        if module.version.is_empty() {
            return self.invalid(module, "version");
        }

        let url = match archive_url(&module.source, &module.version) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("error resolving tarball for {}: {}", target.display(), e);
                return Ok(Outcome::failed(e));
            }
        };

        tracing::info!("Downloading: {}", url);
        let body = match self.source.open(&url) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("error retrieving tarball for {}: {}", target.display(), e);
                return Ok(Outcome::failed(e));
            }
        };

        match extract(&target, body) {
            Ok(()) => Ok(Outcome::Installed),
            Err(e) => {
                tracing::error!("error processing tarball for {}: {}", target.display(), e);
                Ok(Outcome::failed(e))
            }
        }
    }

    fn invalid(
        &self,
        module: &ModuleDescriptor,
        field: &'static str,
    ) -> Result<Outcome, InstallError> {
        let err = InstallError::InvalidDescriptor {
            name: module.name.clone(),
            field,
        };

        if self.settings.strict_validation {
            return Err(err);
        }

        tracing::error!("{}, skipping...", err);
        Ok(Outcome::failed(err))
    }
}

/// Module names become a directory under the install root and must not leave it.
fn is_plain_relative(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
