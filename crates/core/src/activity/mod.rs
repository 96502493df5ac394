pub mod report;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub use report::{ActionCount, ActivityReport};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ACTION_GENERATED: &str = "Generated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub actor: String,
    pub action: String,
    pub timestamp: String,
}

/// Append-only `actor,action,timestamp` log. Rows are CSV-quoted only when a field needs it,
/// so ordinary names stay plain lines.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamps the current local time and appends the row.
    pub fn record(&self, actor: &str, action: &str) -> anyhow::Result<ActivityRecord> {
        let record = ActivityRecord {
            actor: actor.to_string(),
            action: action.to_string(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        self.append(&record)?;
        Ok(record)
    }

    pub fn append(&self, record: &ActivityRecord) -> anyhow::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::with_capacity(128));
        wtr.write_record([&record.actor, &record.action, &record.timestamp])
            .context("failed to encode activity row")?;
        let row = wtr
            .into_inner()
            .map_err(|e| anyhow!("failed to encode activity row: {}", e.error()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        // One write per row on an O_APPEND handle; concurrent writers interleave whole rows.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open activity log {}", self.path.display()))?;
        file.write_all(&row)
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// `None` when nothing has been logged yet (the file does not exist).
    pub fn read_all(&self) -> anyhow::Result<Option<Vec<ActivityRecord>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to open activity log {}", self.path.display()))
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut out = Vec::new();
        for (idx, row) in rdr.records().enumerate() {
            match row {
                Ok(row) if row.len() == 3 => out.push(ActivityRecord {
                    actor: row[0].to_string(),
                    action: row[1].to_string(),
                    timestamp: row[2].to_string(),
                }),
                Ok(row) => {
                    tracing::warn!(row = idx + 1, fields = row.len(), "skipping malformed activity row");
                }
                Err(err) => {
                    tracing::warn!(row = idx + 1, error = %err, "skipping unreadable activity row");
                }
            }
        }
        Ok(Some(out))
    }

    pub fn report(&self) -> anyhow::Result<Option<ActivityReport>> {
        Ok(self.read_all()?.map(ActivityReport::from_records))
    }
}
