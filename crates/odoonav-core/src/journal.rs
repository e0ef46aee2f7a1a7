use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::JournalError;
use crate::model::IntentKind;
use crate::state::ResolutionOutcome;
use crate::state::ResolutionStatus;

const TAIL_CHUNK: u64 = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub input: String,
    pub status: ResolutionStatus,
    pub intent_kind: Option<IntentKind>,
    pub entity: Option<String>,
    pub record_kind: Option<String>,
    pub url: Option<String>,
    pub tier: Option<String>,
    pub error: Option<String>,
}

impl JournalEntry {
    pub fn from_outcome(outcome: &ResolutionOutcome) -> Self {
        let intent = outcome.intent.as_ref();
        Self {
            input: outcome.input.clone(),
            status: outcome.status,
            intent_kind: intent.map(|intent| intent.kind),
            entity: intent
                .map(|intent| intent.entity.clone())
                .filter(|entity| !entity.is_empty()),
            record_kind: intent.and_then(|intent| intent.record_kind.clone()),
            url: outcome.url.as_ref().map(|url| url.to_string()),
            tier: outcome.tier.map(|tier| tier.to_string()),
            error: outcome.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub ts_ms: i64,
    #[serde(flatten)]
    pub entry: JournalEntry,
}

#[derive(Debug)]
pub struct ResolutionJournal {
    path: PathBuf,
    next_seq: u64,
}

impl ResolutionJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let next_seq = newest_records(path.as_path(), 1)?
            .first()
            .map_or(1, |record| record.seq.saturating_add(1));
        Ok(Self { path, next_seq })
    }

    pub fn append(&mut self, entry: JournalEntry) -> Result<u64, JournalError> {
        let seq = self.next_seq;
        let record = JournalRecord {
            seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            entry,
        };
        let line = serde_json::to_string(&record)?;
        append_line(self.path.as_path(), line.as_str())?;
        self.next_seq = self.next_seq.saturating_add(1);
        Ok(seq)
    }

    pub fn tail(&self, count: usize) -> Result<Vec<JournalRecord>, JournalError> {
        let mut records = newest_records(self.path.as_path(), count)?;
        records.reverse();
        Ok(records)
    }
}

/// Up to `count` parseable records, newest first. The file is read backwards in
/// chunks; corrupt and blank lines are skipped.
fn newest_records(path: &Path, count: usize) -> Result<Vec<JournalRecord>, JournalError> {
    if count == 0 || !path.exists() {
        return Ok(Vec::new());
    }
    let mut file = File::open(path)?;
    let mut pos = file.seek(SeekFrom::End(0))?;
    // Bytes after `pos` that precede the first newline seen so far.
    let mut partial: Vec<u8> = Vec::new();
    let mut records = Vec::new();
    while pos > 0 && records.len() < count {
        let start = pos.saturating_sub(TAIL_CHUNK);
        let mut buf = vec![0_u8; (pos - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut buf)?;
        buf.extend_from_slice(&partial);
        pos = start;

        let complete_from = if pos == 0 {
            0
        } else {
            match buf.iter().position(|byte| *byte == b'\n') {
                Some(newline) => newline + 1,
                None => {
                    partial = buf;
                    continue;
                }
            }
        };
        for line in buf[complete_from..].split(|byte| *byte == b'\n').rev() {
            if records.len() == count {
                break;
            }
            if let Some(record) = parse_record(line) {
                records.push(record);
            }
        }
        buf.truncate(complete_from);
        partial = buf;
    }
    Ok(records)
}

fn parse_record(line: &[u8]) -> Option<JournalRecord> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(line).ok()
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(())
}
