use crate::digest::{compute_hash, Digest};
use crate::matcher::{CorpusEntry, SimilaritySource};
use crate::segment::{hashes, Paragraph};
use crate::tree::build_digest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome label shown next to a submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Verified,
    Pending,
    Flagged,
}

impl SubmissionStatus {
    /// Label a similarity score against a threshold (both percentages).
    pub fn classify(similarity: f64, threshold: f64) -> Self {
        if similarity > threshold {
            Self::Flagged
        } else {
            Self::Verified
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Verified => "verified",
            Self::Pending => "pending",
            Self::Flagged => "flagged",
        };
        f.pad(s)
    }
}

/// Descriptive fields supplied by the uploader.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionMeta {
    pub title: String,
    pub course_code: String,
    pub document_type: String,
    pub description: String,
    pub author_id: String,
    pub author_name: String,
    pub university: String,
}

/// A persisted submission: text, fingerprint and similarity findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub course_code: String,
    pub document_type: String,
    pub description: String,
    pub author_id: String,
    pub author_name: String,
    pub university: String,
    pub created_at: DateTime<Utc>,
    pub full_text: String,
    pub paragraphs: Vec<Paragraph>,
    /// Root digest over the paragraph hashes, in paragraph order.
    pub merkle_root: Digest,
    pub similarity_score: f64,
    pub status: SubmissionStatus,
    pub plagiarism_sources: Vec<SimilaritySource>,
}

impl Submission {
    /// A record with no analysis yet: status `Pending`, no paragraphs.
    pub fn pending(meta: SubmissionMeta, full_text: String) -> Self {
        Self::with_timestamp(meta, full_text, Utc::now())
    }

    /// Like [`Submission::pending`] with an explicit timestamp (for testing).
    pub fn with_timestamp(
        meta: SubmissionMeta,
        full_text: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: meta.title,
            course_code: meta.course_code,
            document_type: meta.document_type,
            description: meta.description,
            author_id: meta.author_id,
            author_name: meta.author_name,
            university: meta.university,
            created_at,
            full_text,
            paragraphs: Vec::new(),
            merkle_root: Digest::new(),
            similarity_score: 0.0,
            status: SubmissionStatus::Pending,
            plagiarism_sources: Vec::new(),
        }
    }

    /// Project this record into the shape the matcher reads.
    pub fn to_corpus_entry(&self) -> CorpusEntry {
        CorpusEntry {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            title: self.title.clone(),
            author_name: self.author_name.clone(),
            paragraph_hashes: Some(hashes(&self.paragraphs)),
        }
    }

    /// Recompute the root digest with leaves rehashed from the paragraph
    /// texts, not read from the stored hashes.
    pub fn recompute_root(&self) -> Digest {
        let leaves: Vec<Digest> = self
            .paragraphs
            .iter()
            .map(|p| compute_hash(p.text.as_bytes()))
            .collect();
        build_digest(&leaves)
    }

    /// Whether every paragraph and the stored root still match the content.
    pub fn verify_integrity(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::verify) && self.recompute_root() == self.merkle_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    fn meta(author: &str) -> SubmissionMeta {
        SubmissionMeta {
            title: "Distributed systems essay".into(),
            course_code: "CS401".into(),
            document_type: "essay".into(),
            author_id: author.into(),
            author_name: format!("Student {}", author),
            ..Default::default()
        }
    }

    fn analysed(author: &str, text: &str) -> Submission {
        let mut s = Submission::pending(meta(author), text.into());
        s.paragraphs = segment(text);
        s.merkle_root = build_digest(&hashes(&s.paragraphs));
        s
    }

    #[test]
    fn classify_against_threshold() {
        assert_eq!(SubmissionStatus::classify(0.0, 25.0), SubmissionStatus::Verified);
        assert_eq!(SubmissionStatus::classify(25.0, 25.0), SubmissionStatus::Verified);
        assert_eq!(SubmissionStatus::classify(33.4, 25.0), SubmissionStatus::Flagged);
    }

    #[test]
    fn new_submission_is_pending() {
        let s = Submission::pending(meta("a"), String::new());
        assert_eq!(s.status, SubmissionStatus::Pending);
        assert!(s.merkle_root.is_empty());
        assert!(!s.id.is_empty());
    }

    #[test]
    fn submissions_have_unique_ids() {
        let ts = Utc::now();
        let s1 = Submission::with_timestamp(meta("a"), "x".into(), ts);
        let s2 = Submission::with_timestamp(meta("a"), "x".into(), ts);
        assert_ne!(s1.id, s2.id);
    }

    #[test]
    fn corpus_entry_keeps_hash_order() {
        let s = analysed("a", "Paragraph number one.\nParagraph number two.");
        let entry = s.to_corpus_entry();
        assert_eq!(entry.id, s.id);
        assert_eq!(entry.author_id, "a");
        assert_eq!(entry.paragraph_hashes, Some(hashes(&s.paragraphs)));
    }

    #[test]
    fn digest_ignores_metadata() {
        let text = "Same paragraph text one.\nSame paragraph text two.";
        let a = analysed("alice", text);
        let b = analysed("bob", text);
        assert_eq!(a.merkle_root, b.merkle_root);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn integrity_detects_tampering() {
        let mut s = analysed("a", "Original paragraph one.\nOriginal paragraph two.");
        assert!(s.verify_integrity());

        s.paragraphs[1].text = "Edited paragraph two.".into();
        assert!(!s.verify_integrity());

        let mut s = analysed("a", "Original paragraph one.\nOriginal paragraph two.");
        s.paragraphs.swap(0, 1);
        assert!(!s.verify_integrity());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SubmissionStatus::Flagged).unwrap();
        assert_eq!(json, "\"flagged\"");
        assert_eq!(SubmissionStatus::Verified.to_string(), "verified");
    }
}
