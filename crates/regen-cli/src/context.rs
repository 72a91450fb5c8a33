//! Project context: where regen.toml lives and what it says.

use std::path::{Path, PathBuf};

use regen_core::{ChecksumRegistry, RegenConfig, file_identity};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Context {
    /// Absolute directory that relative paths in the config are resolved
    /// against. Registry keys are relative to it.
    pub root: PathBuf,
    pub config: RegenConfig,
}

impl Context {
    /// Loads the explicit config file, or `regen.toml` from the working
    /// directory when there is one.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                let config = RegenConfig::load(path)?;
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let root = std::path::absolute(parent)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(Self { root, config })
            }
            None => {
                let root = std::env::current_dir()?;
                let config = RegenConfig::discover(&root)?;
                Ok(Self { root, config })
            }
        }
    }

    /// Registry key for a path given on the command line.
    pub fn identity(&self, path: &Path) -> Result<String> {
        Ok(file_identity(&self.root, &std::path::absolute(path)?))
    }

    pub fn registry_path(&self) -> PathBuf {
        self.config.registry_path(&self.root)
    }

    pub fn load_registry(&self) -> Result<ChecksumRegistry> {
        Ok(ChecksumRegistry::load(&self.registry_path())?)
    }

    pub fn save_registry(&self, registry: &ChecksumRegistry) -> Result<()> {
        Ok(registry.save(&self.registry_path())?)
    }
}
