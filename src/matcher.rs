use crate::digest::{is_well_formed, Digest};
use crate::segment::Paragraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A previously accepted submission as seen by the matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusEntry {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub author_name: String,
    /// Ordered paragraph hashes; `None` when the record lost them.
    #[serde(default)]
    pub paragraph_hashes: Option<Vec<Digest>>,
}

/// Read-only, ordered snapshot of the corpus for one comparison.
pub type Corpus = Vec<CorpusEntry>;

/// One prior document that shares paragraphs with the new document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilaritySource {
    pub document_id: String,
    pub document_title: String,
    pub author_name: String,
    /// Share of the new document's paragraphs attributed here, in [0, 100].
    pub similarity_percentage: f64,
}

/// Outcome of comparing one document against a corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub paragraphs: Vec<Paragraph>,
    pub overall_similarity: f64,
    pub sources: Vec<SimilaritySource>,
}

impl MatchReport {
    pub fn matched_count(&self) -> usize {
        self.paragraphs.iter().filter(|p| p.is_plagiarized).count()
    }
}

/// Corpus entry with its hashes indexed for lookup.
struct Candidate<'a> {
    entry: &'a CorpusEntry,
    hashes: HashSet<&'a str>,
}

impl<'a> Candidate<'a> {
    fn prepare(entry: &'a CorpusEntry) -> Option<Self> {
        let Some(list) = entry.paragraph_hashes.as_ref() else {
            warn!(entry_id = %entry.id, "corpus entry has no paragraph hashes, skipping");
            return None;
        };
        if let Some(bad) = list.iter().find(|h| !is_well_formed(h)) {
            warn!(entry_id = %entry.id, hash = %bad, "corpus entry has a malformed hash, skipping");
            return None;
        }
        Some(Self {
            entry,
            hashes: list.iter().map(String::as_str).collect(),
        })
    }
}

/// Cross-reference `paragraphs` against `corpus` by exact hash equality.
///
/// Entries written by `exclude_author_id` never count. Each paragraph is
/// attributed to at most one source: the first entry, in corpus order, that
/// contains its hash. Sources appear in the order they were first matched.
pub fn compare(
    mut paragraphs: Vec<Paragraph>,
    corpus: &[CorpusEntry],
    exclude_author_id: &str,
) -> MatchReport {
    let candidates: Vec<Candidate<'_>> = corpus
        .iter()
        .filter(|e| e.author_id != exclude_author_id)
        .filter_map(Candidate::prepare)
        .collect();

    let mut attributed: Vec<(&CorpusEntry, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for para in paragraphs.iter_mut() {
        let Some(found) = candidates
            .iter()
            .find(|c| c.hashes.contains(para.hash.as_str()))
        else {
            continue;
        };
        para.is_plagiarized = true;
        para.source_document_id = Some(found.entry.id.clone());

        let idx = *slot.entry(found.entry.id.as_str()).or_insert_with(|| {
            attributed.push((found.entry, 0));
            attributed.len() - 1
        });
        attributed[idx].1 += 1;
    }

    let total = paragraphs.len();
    let matched: usize = attributed.iter().map(|(_, n)| n).sum();
    let sources = attributed
        .into_iter()
        .map(|(entry, n)| SimilaritySource {
            document_id: entry.id.clone(),
            document_title: entry.title.clone(),
            author_name: entry.author_name.clone(),
            similarity_percentage: percentage(n, total),
        })
        .collect();

    debug!(
        paragraphs = total,
        matched,
        candidates = candidates.len(),
        "comparison finished"
    );

    MatchReport {
        paragraphs,
        overall_similarity: percentage(matched, total),
        sources,
    }
}

/// `part / whole * 100`, defined as 0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
