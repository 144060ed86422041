//! Paragraph-level document fingerprinting.
//!
//! A document is split into hashed paragraphs ([`segment`]), compared by
//! exact hash against previously accepted submissions ([`matcher`]), and
//! folded into one order-sensitive root digest ([`tree`]). The
//! [`registry`] wires these into a submission workflow over an append-only
//! [`storage`] log.

pub mod config;
pub mod digest;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod registry;
pub mod segment;
pub mod storage;
pub mod submission;
pub mod tree;

pub use digest::{compute_hash, Digest};
pub use error::{ExtractionError, ParaprintError, Result};
pub use matcher::{compare, Corpus, CorpusEntry, MatchReport, SimilaritySource};
pub use segment::{segment, Paragraph};
pub use tree::build_digest;
