//! Single-file regeneration: merge a rendered template into its target file.
//!
//! Sequence for one target:
//!
//! 1. validate the template (warnings only);
//! 2. a missing target is written verbatim;
//! 3. otherwise the registry is asked whether generated blocks were edited
//!    by hand (advisory);
//! 4. merge, then write according to the [`ConflictPolicy`];
//! 5. record checksums of whatever ended up on disk.
//!
//! There is no cross-file transaction. Batch callers apply files one at a
//! time and keep going when one of them conflicts.

use crate::config::{ConflictPolicy, RegenConfig};
use crate::merge::{MergeEngine, MergeOptions, MergeResult};
use crate::registry::ChecksumRegistry;
use crate::Result;
use chrono::Utc;
use regen_fs::io;
use regen_markers::validate_markers;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ApplyStatus {
    /// The target did not exist and was written from the template.
    Created,
    /// The merge changed the target.
    Updated,
    /// The merge produced the content already on disk.
    Unchanged,
    /// The merge reported conflicts.
    Conflicted {
        written: bool,
        backup: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub path: PathBuf,
    pub status: ApplyStatus,
    /// `None` for newly created files.
    pub merge: Option<MergeResult>,
    /// Generated blocks that were edited by hand since the last run.
    pub modified_markers: Vec<String>,
    /// Problems the strict validator found in the template.
    pub template_errors: Vec<String>,
}

impl ApplyOutcome {
    pub fn needs_review(&self) -> bool {
        matches!(self.status, ApplyStatus::Conflicted { .. })
    }
}

/// Registry key for a target path: lexically normalized, relative to the
/// project `root` and with `/` separators on every platform.
pub fn file_identity(root: &Path, path: &Path) -> String {
    regen_fs::path::relative_to(root, path)
}

/// Where [`ConflictPolicy::Backup`] saves orphaned content for `target`.
pub fn orphan_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".orphaned");
    target.with_file_name(name)
}

/// Applies rendered templates to files on disk.
#[derive(Debug, Clone)]
pub struct Applier<'c> {
    config: &'c RegenConfig,
    root: &'c Path,
    engine: MergeEngine,
}

impl<'c> Applier<'c> {
    /// Registry keys for targets are taken relative to `root`.
    pub fn new(config: &'c RegenConfig, root: &'c Path) -> Self {
        // Validation happens once here, not again inside the engine.
        let engine = MergeEngine::with_options(MergeOptions {
            validate_template: false,
        });
        Self {
            config,
            root,
            engine,
        }
    }

    pub fn apply(
        &self,
        registry: &mut ChecksumRegistry,
        target: &Path,
        new_content: &str,
    ) -> Result<ApplyOutcome> {
        let identity = file_identity(self.root, target);

        let template_errors = if self.config.validate_templates {
            validate_markers(new_content).errors
        } else {
            Vec::new()
        };
        for problem in &template_errors {
            warn!(file = %identity, %problem, "template markers are malformed");
        }

        let Some(existing) = io::read_text_if_exists(target)? else {
            io::write_text(target, new_content)?;
            registry.store(&identity, new_content);
            info!(file = %identity, "created");
            return Ok(ApplyOutcome {
                path: target.to_path_buf(),
                status: ApplyStatus::Created,
                merge: None,
                modified_markers: Vec::new(),
                template_errors,
            });
        };

        let modified_markers = if self.config.warn_on_modified {
            registry
                .detect_modifications(&identity, &existing)
                .modified_markers
        } else {
            Vec::new()
        };

        let merge = self.engine.merge(&existing, new_content, &identity);

        let status = if merge.success {
            if merge.merged_content == existing {
                ApplyStatus::Unchanged
            } else {
                io::write_text(target, &merge.merged_content)?;
                ApplyStatus::Updated
            }
        } else {
            self.resolve_conflict(target, &merge)?
        };

        let on_disk = match &status {
            ApplyStatus::Conflicted { written: false, .. } => None,
            _ => Some(merge.merged_content.as_str()),
        };
        if let Some(text) = on_disk {
            registry.store(&identity, text);
        }

        info!(file = %identity, ?status, "applied");
        Ok(ApplyOutcome {
            path: target.to_path_buf(),
            status,
            merge: Some(merge),
            modified_markers,
            template_errors,
        })
    }

    fn resolve_conflict(&self, target: &Path, merge: &MergeResult) -> Result<ApplyStatus> {
        let policy = self.config.on_conflict;
        warn!(
            file = %target.display(),
            conflicts = merge.conflicts.len(),
            %policy,
            "merge needs manual review"
        );

        let status = match policy {
            ConflictPolicy::Skip => ApplyStatus::Conflicted {
                written: false,
                backup: None,
            },
            ConflictPolicy::Write => {
                io::write_text(target, &merge.merged_content)?;
                ApplyStatus::Conflicted {
                    written: true,
                    backup: None,
                }
            }
            ConflictPolicy::Backup => {
                let backup = write_orphans(target, merge)?;
                io::write_text(target, &merge.merged_content)?;
                ApplyStatus::Conflicted {
                    written: true,
                    backup,
                }
            }
        };
        Ok(status)
    }
}

/// Appends orphaned custom blocks to the target's `.orphaned` file, wrapped
/// in custom markers so the file can be parsed back. Returns `None` when
/// there was nothing to save.
fn write_orphans(target: &Path, merge: &MergeResult) -> Result<Option<PathBuf>> {
    let orphans: Vec<(&str, &str)> = merge.orphaned().collect();
    if orphans.is_empty() {
        return Ok(None);
    }

    let path = orphan_path(target);
    let mut text = io::read_text_if_exists(&path)?.unwrap_or_default();
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&format!(
        "# Orphaned custom blocks from {} ({})\n",
        target.display(),
        Utc::now().to_rfc3339()
    ));
    for (marker, content) in orphans {
        text.push_str(&format!("CUSTOM_START: {marker}\n"));
        text.push_str(content);
        if !content.is_empty() && !content.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&format!("CUSTOM_END: {marker}\n"));
    }

    io::write_text(&path, &text)?;
    Ok(Some(path))
}
