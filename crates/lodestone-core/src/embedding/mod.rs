//! Document-embedding aggregation.
//!
//! A read-only token-to-vector [`EmbeddingTable`] supplies word vectors;
//! the [`DocumentEmbedder`] mean-pools them over a document window, induces
//! vectors for out-of-vocabulary tokens from their local context, and
//! applies a fixed linear correction (the [`InductionMatrix`]) to every
//! finalized vector so documents and queries stay comparable under cosine
//! similarity.

mod accumulator;
mod embedder;
mod induction;
mod table;

pub use accumulator::RunningMean;
pub use embedder::DocumentEmbedder;
pub use induction::InductionMatrix;
pub use table::{EmbeddingStore, EmbeddingTable};
