//! `regen.toml` configuration

use crate::{Error, Result};
use regen_fs::ConfigStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do with a file whose merge reported conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the file untouched.
    #[default]
    Skip,
    /// Write the best-effort merge; orphaned content is dropped.
    Write,
    /// Save orphaned content next to the file, then write the merge.
    Backup,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Write => write!(f, "write"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "write" => Ok(Self::Write),
            "backup" => Ok(Self::Backup),
            _ => Err(Error::InvalidPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegenConfig {
    /// Checksum registry snapshot, relative to the project root.
    pub registry: PathBuf,
    pub on_conflict: ConflictPolicy,
    /// Run the strict marker validator on templates before merging.
    pub validate_templates: bool,
    /// Warn when a generated block was edited by hand since the last run.
    pub warn_on_modified: bool,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            registry: PathBuf::from(".regen/checksums.json"),
            on_conflict: ConflictPolicy::default(),
            validate_templates: true,
            warn_on_modified: true,
        }
    }
}

impl RegenConfig {
    pub const FILE_NAME: &'static str = "regen.toml";

    /// Loads an explicit config file; the file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Loads `regen.toml` from `root`, or defaults when there is none.
    pub fn discover(root: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&root.join(Self::FILE_NAME))?)
    }

    /// Registry location resolved against `root`.
    pub fn registry_path(&self, root: &Path) -> PathBuf {
        root.join(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Backup".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Backup);
        assert!(matches!(
            "overwrite".parse::<ConflictPolicy>(),
            Err(Error::InvalidPolicy(name)) if name == "overwrite"
        ));
    }

    #[test]
    fn policy_display_roundtrips() {
        for policy in [ConflictPolicy::Skip, ConflictPolicy::Write, ConflictPolicy::Backup] {
            assert_eq!(policy.to_string().parse::<ConflictPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: RegenConfig = toml::from_str("on_conflict = \"write\"").unwrap();
        assert_eq!(config.on_conflict, ConflictPolicy::Write);
        assert!(config.validate_templates);
        assert_eq!(config.registry, PathBuf::from(".regen/checksums.json"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RegenConfig>("colour = true").is_err());
    }
}
