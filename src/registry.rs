use crate::config::Config;
use crate::digest::Digest;
use crate::error::{ParaprintError, Result};
use crate::extract::extract_text;
use crate::matcher::compare;
use crate::segment::{hashes, segment, Paragraph};
use crate::storage::{FileStore, SubmissionLog};
use crate::submission::{Submission, SubmissionMeta, SubmissionStatus};
use crate::tree::build_digest;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn, Level};

const MIN_TITLE_CHARS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// The submission workflow: fingerprint, compare, classify and record.
pub struct Registry<S: SubmissionLog = FileStore> {
    store: S,
    config: Config,
}

/// Paragraphs and root digest of a text, without touching any corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub paragraphs: Vec<Paragraph>,
    pub root: Digest,
}

/// Fingerprint a text.
pub fn fingerprint(text: &str) -> Fingerprint {
    let paragraphs = segment(text);
    let root = build_digest(&hashes(&paragraphs));
    Fingerprint { paragraphs, root }
}

impl Registry<FileStore> {
    /// Open or create a registry rooted at the given directory.
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        config.validate()?;
        let store = FileStore::open(&path.join("store"))?;
        Ok(Self { store, config })
    }

    /// Open a registry that `init` or an earlier submission created.
    pub fn open_existing(path: &Path, config: Config) -> Result<Self> {
        if !path.join("store").is_dir() {
            return Err(ParaprintError::RegistryNotFound(path.display().to_string()));
        }
        Self::open(path, config)
    }

    /// Initialize a registry, writing `config` to its config file if none
    /// exists yet. An existing file is left as is.
    pub fn init(path: &Path, config: Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(path)?;
        let config_path = path.join(crate::config::CONFIG_FILE);
        if !config_path.exists() {
            let data = serde_json::to_vec_pretty(&config)?;
            std::fs::write(&config_path, data)?;
        }
        Self::open(path, config)
    }
}

impl<S: SubmissionLog> Registry<S> {
    pub fn with_store(store: S, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Submission workflow ───────────────────────────────────

    /// Analyse `text` against the current corpus and record the result.
    pub fn submit(&mut self, meta: SubmissionMeta, text: &str) -> Result<Submission> {
        let start = Instant::now();
        validate_meta(&meta)?;

        let span = tracing::span!(Level::INFO, "registry.submit", author_id = %meta.author_id);
        let _guard = span.enter();

        let paragraphs = segment(text);
        let leaves = hashes(&paragraphs);
        let corpus = self.store.snapshot()?;
        let report = compare(paragraphs, &corpus, &meta.author_id);
        let root = build_digest(&leaves);
        let status = SubmissionStatus::classify(report.overall_similarity, self.config.flag_threshold);

        let mut submission = Submission::pending(meta, text.to_string());
        submission.paragraphs = report.paragraphs;
        submission.merkle_root = root;
        submission.similarity_score = report.overall_similarity;
        submission.status = status;
        submission.plagiarism_sources = report.sources;

        if let Err(e) = self.store.append(&submission) {
            warn!(error = %e, "submission_failure");
            return Err(e);
        }

        info!(
            id = %submission.id,
            paragraphs = submission.paragraphs.len(),
            corpus = corpus.len(),
            similarity = submission.similarity_score,
            status = %submission.status,
            root = %submission.merkle_root,
            elapsed_micros = start.elapsed().as_micros(),
            "submission_accepted"
        );
        Ok(submission)
    }

    /// Extract text from an uploaded file and submit it.
    pub fn submit_file(&mut self, meta: SubmissionMeta, path: &Path) -> Result<Submission> {
        let text = extract_text(path, self.config.max_upload_bytes)?;
        self.submit(meta, &text)
    }

    // ── Reports ───────────────────────────────────────────────

    pub fn report(&self, id: &str) -> Result<Submission> {
        self.store.get(id)
    }

    /// All submissions in acceptance order, optionally for one author.
    pub fn list(&self, author_id: Option<&str>) -> Result<Vec<Submission>> {
        let all = self.store.list()?;
        Ok(match author_id {
            Some(author) => all.into_iter().filter(|s| s.author_id == author).collect(),
            None => all,
        })
    }

    pub fn flagged(&self) -> Result<Vec<Submission>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|s| s.status == SubmissionStatus::Flagged)
            .collect())
    }

    /// Recompute a stored submission's fingerprint and compare.
    pub fn verify(&self, id: &str) -> Result<Verification> {
        let submission = self.store.get(id)?;
        let computed_root = submission.recompute_root();
        let intact = submission.verify_integrity();
        if !intact {
            warn!(id = %id, stored = %submission.merkle_root, computed = %computed_root, "integrity_mismatch");
        }
        Ok(Verification {
            id: submission.id,
            stored_root: submission.merkle_root,
            computed_root,
            intact,
        })
    }

    pub fn stats(&self) -> Result<RegistryStats> {
        let all = self.store.list()?;
        let count = |status: SubmissionStatus| all.iter().filter(|s| s.status == status).count();
        let average_similarity = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|s| s.similarity_score).sum::<f64>() / all.len() as f64
        };
        Ok(RegistryStats {
            total: all.len(),
            verified: count(SubmissionStatus::Verified),
            flagged: count(SubmissionStatus::Flagged),
            pending: count(SubmissionStatus::Pending),
            average_similarity,
            disk_usage: self.store.disk_usage()?,
        })
    }
}

fn validate_meta(meta: &SubmissionMeta) -> Result<()> {
    if meta.title.trim().chars().count() < MIN_TITLE_CHARS {
        return Err(ParaprintError::InvalidSubmission(format!(
            "title must be at least {} characters",
            MIN_TITLE_CHARS
        )));
    }
    if meta.course_code.trim().is_empty() {
        return Err(ParaprintError::InvalidSubmission(
            "course code is required".into(),
        ));
    }
    if meta.author_id.trim().is_empty() {
        return Err(ParaprintError::InvalidSubmission(
            "author id is required".into(),
        ));
    }
    if meta.description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ParaprintError::InvalidSubmission(format!(
            "description must not exceed {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

/// Result of re-checking a stored fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub id: String,
    pub stored_root: Digest,
    pub computed_root: Digest,
    pub intact: bool,
}

impl std::fmt::Display for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Submission: {}", self.id)?;
        writeln!(f, "Stored:     {}", display_root(&self.stored_root))?;
        writeln!(f, "Computed:   {}", display_root(&self.computed_root))?;
        writeln!(f, "Status:     {}", if self.intact { "intact" } else { "TAMPERED" })?;
        Ok(())
    }
}

/// Render a root digest, spelling out the empty sentinel.
pub fn display_root(root: &str) -> &str {
    if root.is_empty() {
        "(none)"
    } else {
        root
    }
}

/// Registry statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryStats {
    pub total: usize,
    pub verified: usize,
    pub flagged: usize,
    pub pending: usize,
    pub average_similarity: f64,
    pub disk_usage: u64,
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Submissions: {}", self.total)?;
        writeln!(f, "Verified:    {}", self.verified)?;
        writeln!(f, "Flagged:     {}", self.flagged)?;
        writeln!(f, "Pending:     {}", self.pending)?;
        writeln!(f, "Avg score:   {:.1}%", self.average_similarity)?;
        writeln!(f, "Disk:        {} bytes", self.disk_usage)?;
        Ok(())
    }
}
