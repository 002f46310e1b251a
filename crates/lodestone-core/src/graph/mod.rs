//! Cooccurrence-graph construction and graph-centrality ranking.
//!
//! The [`CooccurrenceGraph`] accumulates window-normalized frequency,
//! cooccurrence, and succession counters token-by-token in the same
//! streaming pass that feeds the embedding aggregator. The sparse
//! [`AffinityMatrix`] is derived on demand, and [`centrality`] solves for
//! its stationary distribution by power iteration.

mod centrality;
mod cooccurrence;

pub use centrality::{centrality, CentralityConfig};
pub use cooccurrence::{AffinityMatrix, CooccurrenceGraph, TokenDictionary};
