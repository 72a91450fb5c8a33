//! Checksums of generated blocks, for detecting hand edits between runs.
//!
//! The registry is an explicit value owned by the caller. It has no internal
//! locking: mutation goes through `&mut self`, so callers that regenerate files
//! in parallel share it behind a `Mutex`.
//!
//! Detection is advisory. The merge engine never consults the registry; it
//! exists so a caller can warn before overwriting a generated region that was
//! edited by hand.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use regen_fs::{ConfigStore, checksum};
use regen_markers::{BlockKind, parse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Checksum of one generated block as last emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumRecord {
    pub marker: String,
    pub checksum: String,
    pub last_computed_at: DateTime<Utc>,
}

/// Result of [`ChecksumRegistry::detect_modifications`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationReport {
    pub modified: bool,
    /// Markers whose content changed, in order of appearance.
    pub modified_markers: Vec<String>,
}

/// Marker → record, for one file.
pub type FileChecksums = BTreeMap<String, ChecksumRecord>;

/// File identity → marker → record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecksumRegistry {
    files: BTreeMap<String, FileChecksums>,
}

impl ChecksumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the checksum of every generated block in `text`, replacing
    /// whatever was stored for `file_identity` before.
    ///
    /// Returns the number of records stored.
    pub fn store(&mut self, file_identity: &str, text: &str) -> usize {
        let parsed = parse(file_identity, text);
        let now = Utc::now();

        let records: FileChecksums = parsed
            .indexed(BlockKind::Generated)
            .into_iter()
            .map(|block| {
                let record = ChecksumRecord {
                    marker: block.marker.clone(),
                    checksum: checksum::compute_content_checksum(&block.content),
                    last_computed_at: now,
                };
                (block.marker.clone(), record)
            })
            .collect();

        let count = records.len();
        debug!(file = file_identity, records = count, "stored generated block checksums");
        self.files.insert(file_identity.to_string(), records);
        count
    }

    /// Compares the generated blocks of `text` against the stored records.
    ///
    /// Markers without a stored record are new, not modified. A file without
    /// any record reports nothing.
    pub fn detect_modifications(&self, file_identity: &str, text: &str) -> ModificationReport {
        let Some(stored) = self.files.get(file_identity) else {
            return ModificationReport::default();
        };

        let parsed = parse(file_identity, text);
        let modified_markers: Vec<String> = parsed
            .indexed(BlockKind::Generated)
            .into_iter()
            .filter(|block| {
                stored.get(&block.marker).is_some_and(|record| {
                    record.checksum != checksum::compute_content_checksum(&block.content)
                })
            })
            .map(|block| {
                warn!(
                    file = file_identity,
                    marker = %block.marker,
                    "generated block was edited by hand"
                );
                block.marker.clone()
            })
            .collect();

        ModificationReport {
            modified: !modified_markers.is_empty(),
            modified_markers,
        }
    }

    /// Removes one file's records, or every record when `file_identity` is
    /// `None`.
    pub fn clear(&mut self, file_identity: Option<&str>) {
        match file_identity {
            Some(file) => {
                self.files.remove(file);
            }
            None => self.files.clear(),
        }
    }

    /// Removes a single marker's record.
    pub fn remove(&mut self, file_identity: &str, marker: &str) -> Option<ChecksumRecord> {
        let records = self.files.get_mut(file_identity)?;
        let removed = records.remove(marker);
        if records.is_empty() {
            self.files.remove(file_identity);
        }
        removed
    }

    pub fn get(&self, file_identity: &str) -> Option<&FileChecksums> {
        self.files.get(file_identity)
    }

    /// Read-only view of every record.
    pub fn all(&self) -> &BTreeMap<String, FileChecksums> {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files with records.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Loads a registry snapshot. A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let registry: Self = ConfigStore::new().load_or_default(path)?;

        for (file, records) in &registry.files {
            for (marker, record) in records {
                if !checksum::is_checksum(&record.checksum) {
                    return Err(Error::CorruptRegistry {
                        path: path.to_path_buf(),
                        message: format!("invalid checksum for '{marker}' in '{file}'"),
                    });
                }
            }
        }

        debug!(path = %path.display(), files = registry.len(), "loaded checksum registry");
        Ok(registry)
    }

    /// Writes a registry snapshot atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        debug!(path = %path.display(), files = self.len(), "saved checksum registry");
        Ok(())
    }
}
