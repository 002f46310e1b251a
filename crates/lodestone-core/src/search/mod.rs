//! The growable approximate-nearest-neighbor store and its query paths.
//!
//! [`SemanticIndex`] is the single piece of state shared across ingest
//! workers: an HNSW graph plus an append-only ledger of indexed documents,
//! guarded by one read-write lock. Approximate queries trade precision for
//! sub-linear latency; exact queries scan the ledger and are always correct.

mod engine;
mod types;
mod vector;

pub use engine::{Ledger, QueryMode, SemanticIndex};
pub use types::{
    cosine_similarity, validate_dimension, DocId, Document, SearchError, SearchHit,
};
pub use vector::VectorIndex;
