//! HNSW-backed vector index.

use hnsw::{Hnsw, Params, Searcher};
use space::{Metric, Neighbor};

use crate::config::{EF_CONSTRUCTION, HNSW_M, HNSW_M0};

/// Cosine distance scaled to u32 for the HNSW graph.
///
/// Distance is `1 - cosine_similarity`, in [0, 2], scaled across the u32
/// range. Zero-norm vectors map to the maximum distance so they can never
/// rank as similar to anything.
struct CosineDistance;

impl Metric<Box<[f32]>> for CosineDistance {
    type Unit = u32;

    fn distance(&self, a: &Box<[f32]>, b: &Box<[f32]>) -> u32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return u32::MAX;
        }
        let distance = 1.0 - dot / (norm_a * norm_b);
        (distance * (u32::MAX as f32 / 2.0)) as u32
    }
}

/// Converts a graph distance back into a similarity in [0, 1].
fn similarity_from(distance: u32) -> f32 {
    let distance = (distance as f32) / (u32::MAX as f32 / 2.0);
    (1.0 - distance).clamp(0.0, 1.0)
}

/// Growable approximate-nearest-neighbor graph over document embeddings.
///
/// Wraps rust-cv's incremental HNSW with M = 32 links per node (M0 = 64 at
/// layer 0) and a construction search width of 256. Entries are identified
/// by insertion position; the ledger maps positions to document ids.
///
/// Inserts mutate the long-lived construction searcher and therefore take
/// `&mut self`; queries allocate a scratch searcher so they can run
/// concurrently under a shared lock.
pub struct VectorIndex {
    graph: Hnsw<CosineDistance, Box<[f32]>, rand::rngs::StdRng, HNSW_M, HNSW_M0>,
    searcher: Searcher<u32>,
    dimension: usize,
}

impl VectorIndex {
    /// Creates an empty index for `dimension`-sized embeddings.
    pub fn new(dimension: usize) -> Self {
        let params = Params::new().ef_construction(EF_CONSTRUCTION);
        Self {
            graph: Hnsw::new_params(CosineDistance, params),
            searcher: Searcher::default(),
            dimension,
        }
    }

    /// Embedding dimension this index was built for.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Inserts an embedding, returning its position in the graph.
    ///
    /// Insertion is incremental; no rebuild is ever required. The caller
    /// guarantees the dimension matches.
    pub fn insert(&mut self, embedding: Box<[f32]>) -> usize {
        debug_assert_eq!(embedding.len(), self.dimension);
        self.graph.insert(embedding, &mut self.searcher)
    }

    /// Returns up to `k` approximate nearest neighbors as
    /// (position, similarity) pairs, most similar first.
    ///
    /// `ef` is the query-time search width; larger widths improve recall at
    /// the cost of latency. Results are not guaranteed to be the exact
    /// nearest neighbors.
    pub fn nearest(&self, query: &[f32], ef: usize, k: usize) -> Vec<(usize, f32)> {
        if self.graph.is_empty() {
            return Vec::new();
        }
        let found = k.min(self.graph.len());
        let mut neighbors = vec![
            Neighbor {
                index: !0,
                distance: !0,
            };
            found
        ];
        let query: Box<[f32]> = query.to_vec().into_boxed_slice();
        let mut searcher = Searcher::default();
        self.graph
            .nearest(&query, ef.max(found), &mut searcher, &mut neighbors);
        neighbors
            .into_iter()
            .filter(|n| n.index != !0)
            .map(|n| (n.index, similarity_from(n.distance)))
            .collect()
    }
}
