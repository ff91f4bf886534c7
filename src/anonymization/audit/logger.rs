//! Audit logger for processing runs

use super::{AuditEntry, RunSummary};
use crate::config::AuditConfig;
use crate::domain::Result;
use anyhow::Context;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Audit log line
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    entries: &'a [AuditEntry],
}

/// Append-only audit writer
///
/// JSON mode writes one line per run holding the summary and every entry;
/// plain text mode writes a one-line summary.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create an audit logger from the `[audit]` section
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one run
    pub fn log_run(&self, summary: &RunSummary, entries: &[AuditEntry]) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let line = serde_json::to_string(&AuditLogEntry { summary, entries })
                .context("Failed to serialize audit entry")?;
            writeln!(file, "{line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Run: {} | Regulation: {} | Entities: {} | Quality: {} | Retries: {}",
                summary.timestamp.to_rfc3339(),
                summary.run_id,
                summary.primary_regulation,
                summary.entity_count,
                if summary.quality_passed { "passed" } else { "failed" },
                summary.retry_count
            )
            .context("Failed to write audit entry")?;
        }

        tracing::debug!(run_id = %summary.run_id, entries = entries.len(), "Audit run recorded");
        Ok(())
    }
}
