use crate::digest::{compute_hash, Digest};
use serde::{Deserialize, Serialize};

/// Fragments shorter than this (after trimming, in characters) are noise.
pub const MIN_PARAGRAPH_CHARS: usize = 10;

/// A line-delimited fragment of document text plus its content hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub hash: Digest,
    #[serde(default)]
    pub is_plagiarized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
}

impl Paragraph {
    /// Create an unmatched paragraph; the hash covers `text` byte for byte.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let hash = compute_hash(text.as_bytes());
        Self {
            text,
            hash,
            is_plagiarized: false,
            source_document_id: None,
        }
    }

    /// Verify the paragraph's integrity.
    pub fn verify(&self) -> bool {
        compute_hash(self.text.as_bytes()) == self.hash
    }
}

/// Split raw extracted text into hashed paragraphs, in document order.
///
/// Breaks are `\n`. One `\r` directly before a break, or at the very end
/// of the text, belongs to the break and not to the line, so LF and CRLF
/// files hash alike. A bare `\r` elsewhere is ordinary text: a document
/// using only `\r` breaks is one line. No case, punctuation or whitespace
/// normalization happens before hashing, so matching downstream is exact.
pub fn segment(text: &str) -> Vec<Paragraph> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| line.trim().chars().count() >= MIN_PARAGRAPH_CHARS)
        .map(Paragraph::new)
        .collect()
}

/// The ordered hash list shared by the matcher and the digest builder.
pub fn hashes(paragraphs: &[Paragraph]) -> Vec<Digest> {
    paragraphs.iter().map(|p| p.hash.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_line_breaks_in_order() {
        let paras = segment("Alpha line.\nBeta line.\nGamma line.");
        let texts: Vec<_> = paras.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Alpha line.", "Beta line.", "Gamma line."]);
        assert!(paras.iter().all(|p| !p.is_plagiarized));
        assert!(paras.iter().all(|p| p.source_document_id.is_none()));
    }

    #[test]
    fn short_fragments_are_noise() {
        let paras = segment("\n   \nPage 3\n123456789\nThis one stays.\n\n");
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text, "This one stays.");
    }

    #[test]
    fn minimum_counts_trimmed_characters() {
        // nine characters padded with spaces is still nine
        assert!(segment("   abcdefghi   ").is_empty());
        assert_eq!(segment("abcdefghij").len(), 1);
        // multi-byte characters count once each
        assert_eq!(segment("ééééééééé").len(), 0);
        assert_eq!(segment("éééééééééé").len(), 1);
    }

    #[test]
    fn hash_covers_untrimmed_text() {
        let paras = segment("  indented paragraph text");
        assert_eq!(paras[0].text, "  indented paragraph text");
        assert_eq!(paras[0].hash, compute_hash(b"  indented paragraph text"));
        assert_ne!(paras[0].hash, compute_hash(b"indented paragraph text"));
    }

    #[test]
    fn exact_match_policy() {
        let a = Paragraph::new("The quick brown fox.");
        let b = Paragraph::new("The quick brown fox");
        let c = Paragraph::new("the quick brown fox.");
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
    }

    #[test]
    fn crlf_and_lf_documents_agree() {
        let lf = segment("First paragraph here.\nSecond paragraph here.");
        let crlf = segment("First paragraph here.\r\nSecond paragraph here.");
        assert_eq!(lf, crlf);
    }

    #[test]
    fn trailing_carriage_return_is_part_of_the_break() {
        let plain = segment("Tail paragraph text.");
        assert_eq!(segment("Tail paragraph text.\r"), plain);
        assert_eq!(segment("Tail paragraph text.\r\n"), plain);
        assert_eq!(segment("Tail paragraph text.\n"), plain);
    }

    #[test]
    fn bare_carriage_returns_do_not_split() {
        let paras = segment("First paragraph here.\rSecond paragraph here.");
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text, "First paragraph here.\rSecond paragraph here.");
    }

    #[test]
    fn empty_text_yields_no_paragraphs() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n\n").is_empty());
    }

    #[test]
    fn deterministic() {
        let text = "Lorem ipsum dolor sit amet.\nshort\nConsectetur adipiscing elit.";
        assert_eq!(segment(text), segment(text));
        assert_eq!(hashes(&segment(text)).len(), 2);
    }

    #[test]
    fn tampered_paragraph_fails_verify() {
        let mut p = Paragraph::new("original paragraph");
        assert!(p.verify());
        p.text = "tampered paragraph".into();
        assert!(!p.verify());
    }
}
