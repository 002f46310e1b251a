//! Mean pooling with out-of-vocabulary induction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use super::accumulator::RunningMean;
use super::induction::InductionMatrix;
use super::table::EmbeddingStore;
use crate::error::EmbedError;
use crate::lex::{lex_text, Lexer, SanitizerChain, Spanner};

/// Aggregates in-vocabulary embeddings over one document window and induces
/// vectors for out-of-vocabulary tokens from their local context.
///
/// The induced-vector cache is scoped to one embedding session (one
/// document window), not global: a fresh embedder is built per window.
pub struct DocumentEmbedder {
    store: Arc<dyn EmbeddingStore>,
    induction: Arc<InductionMatrix>,
    pooled: RunningMean,
    induced: HashMap<String, RunningMean>,
}

impl DocumentEmbedder {
    /// Creates an embedder over a shared vocabulary and induction matrix.
    pub fn new(store: Arc<dyn EmbeddingStore>, induction: Arc<InductionMatrix>) -> Self {
        debug_assert_eq!(store.dim(), induction.dim());
        Self {
            store,
            induction,
            pooled: RunningMean::new(),
            induced: HashMap::new(),
        }
    }

    /// Folds the current window into the aggregate.
    ///
    /// The newest token (last in the window) contributes its vocabulary
    /// vector to the document mean when present; out-of-vocabulary tokens
    /// are never pooled directly. When the window is centered on an
    /// out-of-vocabulary token, the embeddings of the *other* window tokens
    /// accumulate into that token's induced-vector entry, resolving
    /// previously-induced neighbors through the cache.
    pub fn observe(&mut self, window: &[String]) {
        if let Some(newest) = window.last() {
            if let Some(v) = self.store.lookup(newest) {
                self.pooled.add(v);
            }
        }
        if window.len() > 2 {
            let center = window.len() / 2;
            let focus = &window[center];
            if self.store.lookup(focus).is_none() {
                let mut context = Vec::with_capacity(window.len() - 1);
                for (i, neighbor) in window.iter().enumerate() {
                    if i == center {
                        continue;
                    }
                    if let Some(v) = self.embed(neighbor) {
                        context.push(v);
                    }
                }
                if !context.is_empty() {
                    let entry = self.induced.entry(focus.clone()).or_default();
                    for v in &context {
                        entry.add(v);
                    }
                    trace!(token = %focus, samples = entry.count(), "induced OOV context");
                }
            }
        }
    }

    /// Resolves a token to a vector: the vocabulary entry if present, else
    /// the induced vector if one has been computed, else `None` (still
    /// unknown).
    pub fn embed(&self, token: &str) -> Option<Vec<f32>> {
        if let Some(v) = self.store.lookup(token) {
            return Some(v.to_vec());
        }
        self.induced.get(token).and_then(RunningMean::mean)
    }

    /// In-vocabulary samples pooled so far.
    pub fn sample_count(&self) -> usize {
        self.pooled.count()
    }

    /// Mean-pools the accumulated samples, applies the induction matrix,
    /// and resets the accumulator for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::EmptyAccumulator`] when no in-vocabulary token
    /// was ever pooled; callers must treat this as "no embedding", never as
    /// a zero vector.
    pub fn finalize(&mut self) -> Result<Vec<f32>, EmbedError> {
        let mean = self.pooled.finalize()?;
        Ok(self.induction.apply(&mean))
    }

    /// Embeds free text through the same path as indexed documents:
    /// sanitize, pool vocabulary hits, apply the induction matrix.
    ///
    /// This is the query-side entry point; using the identical correction on
    /// both sides keeps cosine similarity between queries and documents
    /// meaningful.
    pub fn embed_text(
        store: Arc<dyn EmbeddingStore>,
        induction: Arc<InductionMatrix>,
        text: &str,
    ) -> Result<Vec<f32>, EmbedError> {
        let mut embedder = Self::new(store, induction);
        let mut spanner = Spanner::new(
            crate::config::CONTEXT_SPAN,
            SanitizerChain::default(),
            Lexer::Pass,
        );
        lex_text(text, |raw| {
            let Some(token) = spanner.sanitize(raw) else {
                return true;
            };
            let keep = spanner.advance(token);
            embedder.observe(spanner.window());
            keep
        });
        embedder.finalize()
    }
}
