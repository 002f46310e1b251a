//! Error types for lodestone-core.
//!
//! Search-specific errors (`SearchError`, dimension validation) live in
//! [`crate::search::types`]; this module covers vocabulary loading, message
//! sources, and embedding aggregation.

use thiserror::Error;

/// Errors that can occur while loading the embedding table or the induction
/// matrix.
///
/// These are fatal at startup: the system cannot run without an embedding
/// table, so callers surface them immediately rather than retrying.
#[derive(Debug, Error)]
pub enum VocabError {
    /// Underlying I/O failure while reading the file
    #[error("failed to read vocabulary: {0}")]
    Io(#[from] std::io::Error),
    /// Header line is missing or malformed
    #[error("invalid vocabulary header: {0}")]
    InvalidHeader(String),
    /// File ended before the declared entry count was read
    #[error("truncated vocabulary: expected {expected} entries, read {read}")]
    Truncated {
        /// Entries declared by the header
        expected: usize,
        /// Entries actually read
        read: usize,
    },
    /// Induction matrix payload does not match the declared dimension
    #[error("induction matrix size mismatch: expected {expected} floats, got {actual}")]
    MatrixSizeMismatch {
        /// dim * dim floats expected
        expected: usize,
        /// Floats actually present
        actual: usize,
    },
}

/// Errors from a message source.
///
/// End-of-source is *not* an error: sources signal it with `Ok(None)`. A
/// `SourceError` aborts only the worker draining that source; the pipeline
/// keeps making progress on other channels.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Transient or fatal fetch failure from the backing source
    #[error("source fetch failed: {0}")]
    Fetch(String),
    /// Source produced a record the reader could not interpret
    #[error("malformed message record: {0}")]
    Malformed(String),
}

/// Errors from embedding aggregation.
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// Finalize was called with zero accumulated samples.
    ///
    /// Must never degrade into a zero vector: a zero vector would rank as
    /// spuriously similar to everything under cosine distance.
    #[error("no samples accumulated; document has no embedding")]
    EmptyAccumulator,
}
