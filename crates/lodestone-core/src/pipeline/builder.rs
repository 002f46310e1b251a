//! Per-window document assembly.
//!
//! One [`DocumentBuilder`] drives the whole distillation for a single
//! document window: the spanner feeds the cooccurrence graph, the embedder,
//! and the keyphrase extractor in one streaming pass, and `finalize` packages
//! the result.

use std::sync::Arc;

use crate::config;
use crate::embedding::{DocumentEmbedder, EmbeddingStore, InductionMatrix};
use crate::error::EmbedError;
use crate::graph::{centrality, CentralityConfig, CooccurrenceGraph};
use crate::keyphrase::{KeyphraseExtractor, StopWords};
use crate::lex::{lex_text, Lexer, SanitizerChain, Spanner};
use crate::search::Document;

/// Knobs for window assembly and worker fan-out.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sliding context window width (cooccurrence, adjoints, induction).
    pub context_span: usize,
    /// Tokens consumed per document window.
    pub doc_span: usize,
    /// Maximum tokens per keyphrase.
    pub ngram_cap: usize,
    /// Per-channel byte budget.
    pub byte_budget: usize,
    /// Maximum concurrently active workers.
    pub max_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_span: config::CONTEXT_SPAN,
            doc_span: config::DOC_SPAN,
            ngram_cap: config::NGRAM_CAP,
            byte_budget: 8 << 10,
            max_workers: config::MAX_WORKERS,
        }
    }
}

/// Distills one window of tokens into a [`Document`].
///
/// Dropped and rebuilt per window: the cooccurrence dictionary and the
/// induced-vector cache are session-scoped by construction.
pub struct DocumentBuilder {
    spanner: Spanner,
    graph: CooccurrenceGraph,
    embedder: DocumentEmbedder,
    extractor: KeyphraseExtractor,
    complete: bool,
    bytes_consumed: usize,
}

impl DocumentBuilder {
    /// Creates a builder for one document window.
    pub fn new(
        cfg: &PipelineConfig,
        store: Arc<dyn EmbeddingStore>,
        induction: Arc<InductionMatrix>,
        stops: StopWords,
    ) -> Self {
        Self {
            spanner: Spanner::new(
                cfg.context_span,
                SanitizerChain::default(),
                Lexer::counted(cfg.doc_span),
            ),
            graph: CooccurrenceGraph::new(cfg.context_span),
            embedder: DocumentEmbedder::new(store, induction),
            extractor: KeyphraseExtractor::new(stops, cfg.ngram_cap),
            complete: false,
            bytes_consumed: 0,
        }
    }

    /// Feeds one message's content through the window.
    ///
    /// Returns `false` once the window is complete; tokens remaining in the
    /// message after that point are not consumed.
    pub fn push_text(&mut self, content: &str) -> bool {
        if self.complete {
            return false;
        }
        self.bytes_consumed += content.len();
        let keep = lex_text(content, |raw| {
            let Some(token) = self.spanner.sanitize(raw) else {
                return true;
            };
            let keep = self.spanner.advance(token.clone());
            let window = self.spanner.window();
            self.graph.observe(window);
            self.embedder.observe(window);
            self.extractor.observe(&token, window);
            keep
        });
        if !keep {
            self.complete = true;
        }
        keep
    }

    /// Whether the window has consumed its token allotment.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Tokens accepted into the window so far.
    pub fn tokens_accepted(&self) -> usize {
        self.spanner.accepted()
    }

    /// Bytes of message content consumed by this window.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Ranks keyphrases, finalizes the embedding, and packages the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::EmptyAccumulator`] when not a single
    /// in-vocabulary token was seen; the window has no meaningful vector
    /// and must not be indexed.
    pub fn finalize(mut self, channel_id: &str, timestamp: u64) -> Result<Document, EmbedError> {
        let embedding = self.embedder.finalize()?;
        let scores = centrality(&self.graph.affinity(), CentralityConfig::default());
        let ranking = self.extractor.finalize(&self.graph, &scores);
        Ok(Document {
            created_at: timestamp,
            channel_id: channel_id.to_string(),
            content_length: self.bytes_consumed,
            embedding,
            phrases: ranking.phrases,
            keywords: ranking.keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingTable;
    use std::collections::HashMap;

    fn store() -> Arc<dyn EmbeddingStore> {
        let mut entries = HashMap::new();
        entries.insert("cat".to_string(), vec![1.0, 0.0]);
        entries.insert("dog".to_string(), vec![0.0, 1.0]);
        Arc::new(EmbeddingTable::from_entries(2, entries))
    }

    fn builder(doc_span: usize) -> DocumentBuilder {
        let cfg = PipelineConfig {
            doc_span,
            context_span: 3,
            ngram_cap: 3,
            ..PipelineConfig::default()
        };
        DocumentBuilder::new(
            &cfg,
            store(),
            Arc::new(InductionMatrix::identity(2)),
            StopWords::nltk(),
        )
    }

    #[test]
    fn test_window_completes_at_doc_span() {
        let mut b = builder(4);
        assert!(b.push_text("cat dog cat"));
        assert!(!b.is_complete());
        assert!(!b.push_text("dog cat dog"));
        assert!(b.is_complete());
        assert_eq!(b.tokens_accepted(), 4);
        // further pushes are refused
        assert!(!b.push_text("more text"));
    }

    #[test]
    fn test_finalize_produces_document() {
        let mut b = builder(8);
        b.push_text("the cat chased the dog");
        let doc = b.finalize("channel-1", 42).unwrap();
        assert_eq!(doc.channel_id, "channel-1");
        assert_eq!(doc.created_at, 42);
        assert_eq!(doc.embedding.len(), 2);
        assert!(doc.content_length > 0);
    }

    #[test]
    fn test_all_oov_window_has_no_vector() {
        let mut b = builder(8);
        b.push_text("xylophone quartz nebula");
        assert!(matches!(
            b.finalize("ch", 0),
            Err(EmbedError::EmptyAccumulator)
        ));
    }

    #[test]
    fn test_bytes_consumed_accumulates() {
        let mut b = builder(100);
        b.push_text("cat dog");
        b.push_text("dog cat");
        assert_eq!(b.bytes_consumed(), 14);
    }
}
