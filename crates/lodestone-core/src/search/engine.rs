//! The shared semantic index: ANN graph + append-only ledger.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, instrument};

use super::types::{
    cosine_similarity, validate_dimension, DocId, Document, SearchError, SearchHit,
};
use super::vector::VectorIndex;
use crate::config::{EF_SEARCH, GROWTH_THRESHOLD, INITIAL_CAPACITY};
use crate::embedding::{DocumentEmbedder, EmbeddingStore, InductionMatrix};

/// Query path selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// HNSW graph search: sub-linear latency, results not guaranteed exact.
    Approx,
    /// Cosine scan over the whole ledger: the ground-truth path.
    Exact,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approx" => Ok(QueryMode::Approx),
            "exact" => Ok(QueryMode::Exact),
            other => Err(format!("unknown query mode {other:?} (approx|exact)")),
        }
    }
}

/// Append-only id-to-document table backing the ANN graph.
///
/// Ids are 1..N with no gaps; id assignment and insertion happen together.
/// Capacity doubles *before* an insert whenever occupancy would reach 80%,
/// so capacity is always at least the ledger size.
#[derive(Debug, Default)]
pub struct Ledger {
    documents: Vec<Document>,
    capacity: usize,
}

impl Ledger {
    /// Number of documents recorded.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Current declared capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The document recorded under `id`, if any.
    pub fn get(&self, id: DocId) -> Option<&Document> {
        let idx = (id.as_u32() as usize).checked_sub(1)?;
        self.documents.get(idx)
    }

    /// Iterates (id, document) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (DocId::from_u32(i as u32 + 1), doc))
    }

    /// Grows the declared capacity ahead of the next insert.
    fn ensure_capacity(&mut self) {
        if self.capacity == 0 {
            self.capacity = INITIAL_CAPACITY;
            self.documents.reserve(self.capacity);
        }
        while (self.len() + 1) as f64 >= GROWTH_THRESHOLD * self.capacity as f64 {
            self.capacity *= 2;
            self.documents.reserve(self.capacity - self.documents.len());
            debug!(capacity = self.capacity, "ledger capacity doubled");
        }
    }

    /// Assigns the next sequential id and records the document.
    fn push(&mut self, document: Document) -> DocId {
        self.documents.push(document);
        DocId::from_u32(self.documents.len() as u32)
    }
}

/// Everything the exclusive lock protects: the lazily created graph and the
/// ledger it indexes into. Ledger size and graph contents always agree
/// under the lock.
#[derive(Default)]
struct IndexShared {
    vectors: Option<VectorIndex>,
    ledger: Ledger,
}

/// The growable ANN index shared across all ingest workers.
///
/// The expensive per-document work (tokenizing, embedding, ranking, phrase
/// extraction) happens outside any lock; only the insert critical section
/// (capacity growth, id assignment, ledger write, graph insert) is
/// serialized. Read-only queries run concurrently with each other under the
/// shared lock and observe a consistent ledger/graph snapshot.
pub struct SemanticIndex {
    store: Arc<dyn EmbeddingStore>,
    induction: Arc<InductionMatrix>,
    shared: RwLock<IndexShared>,
}

impl SemanticIndex {
    /// Creates an empty index over a shared vocabulary and induction matrix.
    ///
    /// The ANN graph itself is created lazily on the first insert, once the
    /// embedding dimension is known to be live.
    pub fn new(store: Arc<dyn EmbeddingStore>, induction: Arc<InductionMatrix>) -> Self {
        Self {
            store,
            induction,
            shared: RwLock::new(IndexShared::default()),
        }
    }

    /// Embedding dimension D.
    pub fn dim(&self) -> usize {
        self.store.dim()
    }

    /// Shared handle to the vocabulary.
    pub fn store(&self) -> Arc<dyn EmbeddingStore> {
        Arc::clone(&self.store)
    }

    /// Shared handle to the induction matrix.
    pub fn induction(&self) -> Arc<InductionMatrix> {
        Arc::clone(&self.induction)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.read().ledger.len()
    }

    /// Whether no documents have been indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current ledger capacity (0 until the first insert).
    pub fn capacity(&self) -> usize {
        self.read().ledger.capacity()
    }

    /// Inserts a finalized document.
    ///
    /// Graph creation, capacity growth, id assignment, and the paired
    /// ledger/graph writes form one atomic critical section, so two
    /// concurrent first-inserts can never race to create two graphs and an
    /// id is never observable before its document.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DimensionMismatch`] if the document's
    /// embedding does not match the vocabulary dimension.
    #[instrument(skip_all, fields(channel = %document.channel_id))]
    pub fn insert(&self, document: Document) -> Result<DocId, SearchError> {
        validate_dimension(self.store.dim(), document.embedding.len())?;

        let mut shared = self
            .shared
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let IndexShared { vectors, ledger } = &mut *shared;
        let vectors = vectors.get_or_insert_with(|| {
            info!(dim = self.store.dim(), "creating ANN graph");
            VectorIndex::new(self.store.dim())
        });

        ledger.ensure_capacity();
        let embedding = document.embedding.clone().into_boxed_slice();
        let position = vectors.insert(embedding);
        let id = ledger.push(document);
        debug_assert_eq!(position + 1, id.as_u32() as usize);
        Ok(id)
    }

    /// Embeds query text through the same pipeline as indexed documents.
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        Ok(DocumentEmbedder::embed_text(
            Arc::clone(&self.store),
            Arc::clone(&self.induction),
            text,
        )?)
    }

    /// Queries with `mode` selecting the approximate or exact path.
    pub fn query(&self, text: &str, mode: QueryMode, k: usize) -> Result<Vec<SearchHit>, SearchError> {
        match mode {
            QueryMode::Approx => self.query_approx(text, k),
            QueryMode::Exact => Ok(self.query_exact(text)?.into_iter().take(k).collect()),
        }
    }

    /// Approximate query: up to `k` nearest documents by the graph's
    /// internal metric.
    pub fn query_approx(&self, text: &str, k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let vector = self.embed_query(text)?;
        self.query_approx_vector(&vector, k)
    }

    /// Exact query: cosine similarity against every ledger entry, all
    /// results sorted descending.
    pub fn query_exact(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
        let vector = self.embed_query(text)?;
        self.query_exact_vector(&vector)
    }

    /// Approximate query from a pre-computed vector.
    ///
    /// The search width is fixed at 64, shrunk to the ledger size for small
    /// ledgers.
    pub fn query_approx_vector(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, SearchError> {
        validate_dimension(self.store.dim(), vector.len())?;
        if k == 0 {
            return Err(SearchError::InvalidQuery("k must be greater than 0".into()));
        }
        let shared = self.read();
        let Some(vectors) = shared.vectors.as_ref() else {
            return Ok(Vec::new());
        };
        let ef = EF_SEARCH.min(shared.ledger.len()).max(1);
        let hits = vectors
            .nearest(vector, ef, k)
            .into_iter()
            .filter_map(|(position, score)| {
                let id = DocId::from_u32(position as u32 + 1);
                shared.ledger.get(id).map(|doc| SearchHit {
                    id,
                    score,
                    document: doc.clone(),
                })
            })
            .collect();
        Ok(hits)
    }

    /// Exact query from a pre-computed vector: O(ledger size) scan.
    pub fn query_exact_vector(&self, vector: &[f32]) -> Result<Vec<SearchHit>, SearchError> {
        validate_dimension(self.store.dim(), vector.len())?;
        let shared = self.read();
        let mut hits: Vec<SearchHit> = shared
            .ledger
            .iter()
            .map(|(id, doc)| SearchHit {
                id,
                score: cosine_similarity(vector, &doc.embedding),
                document: doc.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }

    /// The document recorded under `id`, if any.
    pub fn get(&self, id: DocId) -> Option<Document> {
        self.read().ledger.get(id).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, IndexShared> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingTable;
    use std::collections::HashMap;

    fn test_index() -> SemanticIndex {
        let mut entries = HashMap::new();
        entries.insert("cat".to_string(), vec![1.0, 0.0]);
        entries.insert("dog".to_string(), vec![0.0, 1.0]);
        let store: Arc<dyn EmbeddingStore> = Arc::new(EmbeddingTable::from_entries(2, entries));
        SemanticIndex::new(store, Arc::new(InductionMatrix::identity(2)))
    }

    fn doc(channel: &str, embedding: Vec<f32>) -> Document {
        Document {
            created_at: 0,
            channel_id: channel.to_string(),
            content_length: 0,
            embedding,
            phrases: Vec::new(),
            keywords: Vec::new(),
        }
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let index = test_index();
        for i in 0..5 {
            let id = index.insert(doc("ch", vec![i as f32, 1.0])).unwrap();
            assert_eq!(id.as_u32(), i + 1);
        }
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_dimension_mismatch_fails_loudly() {
        let index = test_index();
        let err = index.insert(doc("ch", vec![1.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        let err = index.query_exact_vector(&[1.0]).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_capacity_stays_ahead_of_occupancy() {
        let index = test_index();
        for i in 0..2000u32 {
            index.insert(doc("ch", vec![i as f32, 1.0])).unwrap();
            let len = index.len();
            let capacity = index.capacity();
            assert!(capacity >= len);
            assert!(
                (len as f64) < GROWTH_THRESHOLD * capacity as f64,
                "occupancy {len} breached threshold at capacity {capacity}"
            );
        }
        // 2000 inserts crossed the 80% mark of 1024 and 2048
        assert!(index.capacity() >= 4096);
    }

    #[test]
    fn test_exact_query_self_similarity_is_one() {
        let index = test_index();
        index.insert(doc("ch", vec![0.6, 0.8])).unwrap();
        let hits = index.query_exact_vector(&[0.6, 0.8]).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_query_sorts_descending() {
        let index = test_index();
        index.insert(doc("a", vec![1.0, 0.0])).unwrap();
        index.insert(doc("b", vec![0.0, 1.0])).unwrap();
        index.insert(doc("c", vec![0.7, 0.7])).unwrap();
        let hits = index.query_exact_vector(&[1.0, 0.0]).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].document.channel_id, "a");
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_approx_query_finds_inserted_document() {
        let index = test_index();
        index.insert(doc("a", vec![1.0, 0.0])).unwrap();
        index.insert(doc("b", vec![0.0, 1.0])).unwrap();
        let hits = index.query_approx_vector(&[1.0, 0.05], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.channel_id, "a");
    }

    #[test]
    fn test_query_on_empty_index() {
        let index = test_index();
        assert!(index.query_approx_vector(&[1.0, 0.0], 4).unwrap().is_empty());
        assert!(index.query_exact_vector(&[1.0, 0.0]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let index = test_index();
        assert!(matches!(
            index.query_approx_vector(&[1.0, 0.0], 0),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_query_by_text_round_trip() {
        let index = test_index();
        let embedding = index.embed_query("cat cat").unwrap();
        index.insert(doc("cats", embedding)).unwrap();
        let hits = index.query("cat", QueryMode::Exact, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_concurrent_inserts_keep_ids_gapless() {
        let index = Arc::new(test_index());
        let mut handles = Vec::new();
        for t in 0..4 {
            let index = Arc::clone(&index);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    index
                        .insert(doc(&format!("ch{t}"), vec![i as f32, t as f32 + 1.0]))
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(index.len(), 200);
        // every id in 1..=200 resolves to a document
        for id in 1..=200 {
            assert!(index.get(DocId::from_u32(id)).is_some());
        }
        assert!(index.get(DocId::from_u32(201)).is_none());
    }

    #[test]
    fn test_query_mode_parses() {
        assert_eq!("approx".parse::<QueryMode>().unwrap(), QueryMode::Approx);
        assert_eq!("exact".parse::<QueryMode>().unwrap(), QueryMode::Exact);
        assert!("fuzzy".parse::<QueryMode>().is_err());
    }
}
