/*!
 * Audit Storage
 * Durable backend for the audit tables
 *
 * The default backend keeps one append-only JSON-lines file per table.
 * Cleanup rewrites a table through a temp file and rename, and only when it
 * actually removes rows, so repeating a cleanup leaves the files untouched.
 */

use super::records::{
    ActionRecord, AuditDataset, AuditRecord, AuditTable, CleanupReport, ModificationRecord,
};
use crate::core::errors::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Durable audit storage
///
/// Owned and driven by the single audit writer thread.
pub trait AuditBackend: Send {
    /// Durably append one row
    fn append(&mut self, record: &AuditRecord) -> Result<(), StorageError>;

    /// Push buffered rows to stable storage
    fn flush(&mut self) -> Result<(), StorageError>;

    /// Read every table
    fn load(&self) -> Result<AuditDataset, StorageError>;

    /// Delete rows strictly older than `cutoff`
    fn prune_before(&mut self, cutoff: SystemTime) -> Result<CleanupReport, StorageError>;

    /// Export every table into one timestamped JSON document under `dir`
    fn backup(&mut self, dir: &Path) -> Result<PathBuf, StorageError> {
        self.flush()?;
        let dataset = self.load()?;
        write_backup(&dataset, dir)
    }
}

/// Write a backup document named `audit-backup-<UTC timestamp>.json`
pub fn write_backup(dataset: &AuditDataset, dir: &Path) -> Result<PathBuf, StorageError> {
    let stamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]T[hour][minute][second][subsecond digits:3]Z"
        ))
        .map_err(|e| StorageError::Encoding(e.to_string().into()))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("audit-backup-{}.json", stamp));
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, dataset)?;
        writer.flush()?;
    }
    fs::rename(&tmp, &path)?;

    info!(path = %path.display(), rows = dataset.len(), "Audit backup written");
    Ok(path)
}

/// Append-only JSON-lines tables in one directory
pub struct JsonlAuditStore {
    dir: PathBuf,
    interactions: BufWriter<File>,
    violations: BufWriter<File>,
    modifications: BufWriter<File>,
}

impl JsonlAuditStore {
    /// Open (creating if needed) the tables under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            interactions: open_append(&table_path(&dir, AuditTable::Interactions))?,
            violations: open_append(&table_path(&dir, AuditTable::Violations))?,
            modifications: open_append(&table_path(&dir, AuditTable::Modifications))?,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn writer(&mut self, table: AuditTable) -> &mut BufWriter<File> {
        match table {
            AuditTable::Interactions => &mut self.interactions,
            AuditTable::Violations => &mut self.violations,
            AuditTable::Modifications => &mut self.modifications,
        }
    }

    /// Rewrite one table keeping rows at or after `cutoff`; returns rows removed
    fn prune_table<T>(
        &mut self,
        table: AuditTable,
        cutoff: SystemTime,
        timestamp: impl Fn(&T) -> SystemTime,
    ) -> Result<usize, StorageError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.writer(table).flush()?;
        let path = table_path(&self.dir, table);
        let rows: Vec<T> = read_table(&path)?;
        let before = rows.len();
        let kept: Vec<T> = rows.into_iter().filter(|row| timestamp(row) >= cutoff).collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for row in &kept {
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        *self.writer(table) = open_append(&path)?;
        Ok(removed)
    }
}

impl AuditBackend for JsonlAuditStore {
    fn append(&mut self, record: &AuditRecord) -> Result<(), StorageError> {
        let mut line = match record {
            AuditRecord::Interaction(row) | AuditRecord::Violation(row) => serde_json::to_vec(row)?,
            AuditRecord::Modification(row) => serde_json::to_vec(row)?,
        };
        line.push(b'\n');

        let writer = self.writer(record.table());
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        for table in AuditTable::ALL {
            let writer = self.writer(table);
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }
        Ok(())
    }

    fn load(&self) -> Result<AuditDataset, StorageError> {
        Ok(AuditDataset {
            interactions: read_table(&table_path(&self.dir, AuditTable::Interactions))?,
            violations: read_table(&table_path(&self.dir, AuditTable::Violations))?,
            modifications: read_table(&table_path(&self.dir, AuditTable::Modifications))?,
        })
    }

    fn prune_before(&mut self, cutoff: SystemTime) -> Result<CleanupReport, StorageError> {
        Ok(CleanupReport {
            interactions: self.prune_table(AuditTable::Interactions, cutoff, |r: &ActionRecord| {
                r.timestamp
            })?,
            violations: self.prune_table(AuditTable::Violations, cutoff, |r: &ActionRecord| {
                r.timestamp
            })?,
            modifications: self.prune_table(
                AuditTable::Modifications,
                cutoff,
                |r: &ModificationRecord| r.timestamp,
            )?,
        })
    }
}

fn table_path(dir: &Path, table: AuditTable) -> PathBuf {
    dir.join(format!("{}.jsonl", table.name()))
}

/// Open a table for appending; a torn final row is terminated first
fn open_append(path: &Path) -> Result<BufWriter<File>, StorageError> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    if ends_mid_row(&mut file)? {
        warn!(path = %path.display(), "Terminating torn audit row");
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(BufWriter::new(file))
}

fn ends_mid_row(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read a table, skipping rows that fail to decode (e.g. a torn final line)
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rows = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(row) => rows.push(row),
            Err(e) => warn!(
                path = %path.display(),
                line = number + 1,
                error = %e,
                "Skipping undecodable audit row"
            ),
        }
    }
    Ok(rows)
}
