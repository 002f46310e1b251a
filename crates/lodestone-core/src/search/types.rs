//! Core types for the index and its query paths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EmbedError;
use crate::keyphrase::ScoredPhrase;

/// Ledger-assigned document identifier.
///
/// Ids start at 1 and increase without gaps; assignment happens inside the
/// index's insert critical section, so an id is never observable before its
/// document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(u32);

impl DocId {
    /// Wraps a raw id. Ids are normally produced by the ledger.
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    /// The raw id value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// One indexed document: a distilled window of chat messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unix timestamp of the message that completed the window.
    pub created_at: u64,
    /// Source channel identifier.
    pub channel_id: String,
    /// Bytes of message content consumed to produce this window.
    pub content_length: usize,
    /// Final D-dimensional vector (mean-pooled, induction-corrected).
    pub embedding: Vec<f32>,
    /// Ranked multi-token keyphrases.
    pub phrases: Vec<ScoredPhrase>,
    /// Ranked single tokens and adjoint triples.
    pub keywords: Vec<ScoredPhrase>,
}

/// A query hit: the document plus its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Ledger id of the document.
    pub id: DocId,
    /// Similarity score; higher is more similar.
    pub score: f32,
    /// The matched document.
    pub document: Document,
}

/// Error types for index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// A vector with the wrong dimension reached the index or a similarity
    /// function. This is a programming or configuration error and fails
    /// loudly rather than silently truncating or padding.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension
        expected: usize,
        /// Actual dimension received
        actual: usize,
    },
    /// Query text produced no embedding (e.g. every token out of
    /// vocabulary).
    #[error("query has no embedding: {0}")]
    EmptyQuery(#[from] EmbedError),
    /// Invalid query parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Validates that a vector has the expected dimension.
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), SearchError> {
    if actual == expected {
        Ok(())
    } else {
        Err(SearchError::DimensionMismatch { expected, actual })
    }
}

/// Cosine similarity between two vectors of equal dimension.
///
/// Zero-norm input yields 0.0, a defined neutral value, rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / norm_a / norm_b
}
