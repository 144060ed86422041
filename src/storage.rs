use crate::error::{ParaprintError, Result};
use crate::matcher::Corpus;
use crate::submission::Submission;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Narrow read/append interface over the accepted submissions.
///
/// Order of `list` (and therefore of `snapshot`) is append order, which is
/// the corpus order the matcher attributes by.
pub trait SubmissionLog {
    /// Record a submission. Fails if its id is already present.
    fn append(&mut self, submission: &Submission) -> Result<()>;

    fn get(&self, id: &str) -> Result<Submission>;

    fn list(&self) -> Result<Vec<Submission>>;

    /// Bytes taken by stored records; zero when nothing is on disk.
    fn disk_usage(&self) -> Result<u64> {
        Ok(0)
    }

    /// Owned copy of the corpus, isolated from later appends.
    fn snapshot(&self) -> Result<Corpus> {
        Ok(self
            .list()?
            .iter()
            .map(Submission::to_corpus_entry)
            .collect())
    }
}

/// Directory-backed, append-only submission log.
///
/// Each submission is a JSON file under `submissions/`; `log/append.jsonl`
/// records ids in the order they were accepted.
pub struct FileStore {
    dir: PathBuf,
}

/// One line of the append log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub sequence: u64,
    pub id: String,
    pub timestamp: String,
}

impl FileStore {
    /// Open or create a store at the given directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir.join("submissions"))?;
        fs::create_dir_all(dir.join("log"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Check if a submission exists.
    pub fn contains(&self, id: &str) -> bool {
        valid_id(id) && self.record_path(id).exists()
    }

    /// Entries of the append log, oldest first. Unreadable lines are skipped.
    pub fn log_entries(&self) -> Result<Vec<LogEntry>> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable append log line");
                    None
                }
            })
            .collect())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join("submissions").join(format!("{}.json", id))
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join("log").join("append.jsonl")
    }

    fn load(&self, id: &str) -> Result<Submission> {
        let data = fs::read(self.record_path(id))?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn append_log(&self, id: &str) -> Result<()> {
        let entry = LogEntry {
            sequence: self.next_sequence()?,
            id: id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        f.write_all(line.as_bytes())?;
        Ok(())
    }

    fn next_sequence(&self) -> Result<u64> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(1);
        }
        let content = fs::read_to_string(&path)?;
        Ok(content.lines().count() as u64 + 1)
    }
}

impl SubmissionLog for FileStore {
    fn append(&mut self, submission: &Submission) -> Result<()> {
        if !valid_id(&submission.id) {
            return Err(ParaprintError::InvalidSubmission(format!(
                "unusable id: {:?}",
                submission.id
            )));
        }
        let path = self.record_path(&submission.id);
        if path.exists() {
            return Err(ParaprintError::DuplicateSubmission(submission.id.clone()));
        }
        let data = serde_json::to_vec_pretty(submission)?;
        fs::write(&path, data)?;
        // a record without its log line would never reach the corpus
        if let Err(e) = self.append_log(&submission.id) {
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(id = %submission.id, error = %cleanup, "could not remove unlogged record");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Total bytes used by submission records.
    fn disk_usage(&self) -> Result<u64> {
        let mut total = 0u64;
        for entry in fs::read_dir(self.dir.join("submissions"))? {
            total += entry?.metadata()?.len();
        }
        Ok(total)
    }

    fn get(&self, id: &str) -> Result<Submission> {
        if !self.contains(id) {
            return Err(ParaprintError::SubmissionNotFound(id.into()));
        }
        self.load(id)
    }

    /// Every readable record in append order; corrupt records are skipped.
    fn list(&self) -> Result<Vec<Submission>> {
        let mut out = Vec::new();
        for entry in self.log_entries()? {
            if !valid_id(&entry.id) {
                warn!(id = %entry.id, "skipping log entry with unusable id");
                continue;
            }
            match self.load(&entry.id) {
                Ok(s) => out.push(s),
                Err(e) => warn!(id = %entry.id, error = %e, "skipping unreadable submission"),
            }
        }
        Ok(out)
    }
}

/// In-memory submission log.
#[derive(Default)]
pub struct MemoryStore {
    order: Vec<String>,
    records: HashMap<String, Submission>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl SubmissionLog for MemoryStore {
    fn append(&mut self, submission: &Submission) -> Result<()> {
        if self.records.contains_key(&submission.id) {
            return Err(ParaprintError::DuplicateSubmission(submission.id.clone()));
        }
        self.order.push(submission.id.clone());
        self.records
            .insert(submission.id.clone(), submission.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Submission> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| ParaprintError::SubmissionNotFound(id.into()))
    }

    fn list(&self) -> Result<Vec<Submission>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }
}

/// Ids double as file names.
fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;
    use crate::submission::SubmissionMeta;

    fn submission(author: &str, text: &str) -> Submission {
        let meta = SubmissionMeta {
            title: "Lab report".into(),
            author_id: author.into(),
            ..Default::default()
        };
        let mut s = Submission::pending(meta, text.into());
        s.paragraphs = segment(text);
        s
    }

    #[test]
    fn filestore_append_get() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();

        let s = submission("a", "First paragraph of the report.");
        store.append(&s).unwrap();

        let back = store.get(&s.id).unwrap();
        assert_eq!(back, s);
        assert!(store.contains(&s.id));
        assert!(store.disk_usage().unwrap() > 0);
    }

    #[test]
    fn filestore_rejects_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();

        let s = submission("a", "Some paragraph content.");
        store.append(&s).unwrap();
        assert!(matches!(
            store.append(&s),
            Err(ParaprintError::DuplicateSubmission(_))
        ));
        assert_eq!(store.log_entries().unwrap().len(), 1);
    }

    #[test]
    fn filestore_preserves_append_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        let subs: Vec<_> = (0..4)
            .map(|i| submission("a", &format!("Paragraph number {}", i)))
            .collect();
        for s in &subs {
            store.append(s).unwrap();
        }

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        let expected: Vec<_> = subs.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, expected);

        let seqs: Vec<_> = store.log_entries().unwrap().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn filestore_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let s = submission("a", "Persisted paragraph text.");
        {
            let mut store = FileStore::open(tmp.path()).unwrap();
            store.append(&s).unwrap();
        }
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.snapshot().unwrap(), vec![s.to_corpus_entry()]);
    }

    #[test]
    fn failed_log_append_leaves_no_record() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        // a directory where the log file should be makes every log write fail
        fs::create_dir_all(store.log_path()).unwrap();

        let s = submission("a", "Never reaches the log.");
        assert!(matches!(store.append(&s), Err(ParaprintError::Io(_))));
        assert!(!store.contains(&s.id));
        assert!(store.get(&s.id).is_err());
        assert_eq!(store.disk_usage().unwrap(), 0);
    }

    #[test]
    fn corrupt_record_is_skipped_in_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        let bad = submission("a", "Will be corrupted later.");
        let good = submission("b", "Stays readable forever.");
        store.append(&bad).unwrap();
        store.append(&good).unwrap();

        fs::write(store.record_path(&bad.id), b"{ not json").unwrap();

        let corpus = store.snapshot().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].id, good.id);
        assert!(store.get(&bad.id).is_err());
    }

    #[test]
    fn unknown_and_unsafe_ids_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.get("missing"),
            Err(ParaprintError::SubmissionNotFound(_))
        ));
        assert!(matches!(
            store.get("../outside"),
            Err(ParaprintError::SubmissionNotFound(_))
        ));
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let mut store = MemoryStore::new();
        store.append(&submission("a", "Earlier paragraph text.")).unwrap();
        let snap = store.snapshot().unwrap();
        store.append(&submission("b", "Later paragraph text.")).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        let s = submission("a", "In memory paragraph.");
        store.append(&s).unwrap();
        assert_eq!(store.get(&s.id).unwrap(), s);
        assert!(store.append(&s).is_err());
        assert!(store.get("nope").is_err());
    }
}
