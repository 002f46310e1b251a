//! Streaming phrase segmentation and scoring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{stem, StopWords};
use crate::graph::CooccurrenceGraph;

/// A phrase or adjoint triple with its relevance score.
///
/// Tokens are the raw (display) forms; scoring happened against the stemmed
/// forms where applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPhrase {
    /// Raw token sequence for display.
    pub tokens: Vec<String>,
    /// Relevance score; higher is better.
    pub score: f64,
}

impl ScoredPhrase {
    /// The phrase joined for display.
    pub fn display(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Ranked extraction output, split per the document model.
#[derive(Debug, Clone, Default)]
pub struct KeyphraseRanking {
    /// Multi-token phrases, sorted descending by score.
    pub phrases: Vec<ScoredPhrase>,
    /// Single tokens and adjoint triples, sorted descending by score.
    pub keywords: Vec<ScoredPhrase>,
}

/// Stop-word-delimited phrase segmentation with adjoint-triple detection.
///
/// Fed once per advance in the same streaming pass that maintains the
/// cooccurrence graph. A phrase buffer of stemmed tokens (with a parallel
/// raw buffer for display) accumulates non-stop-word tokens and closes on a
/// stop-word or at the n-gram cap; separately, every 3-token window whose
/// outer tokens are non-stop-words is recorded as an adjoint observation.
pub struct KeyphraseExtractor {
    stops: StopWords,
    ngram_cap: usize,
    completed: Vec<(Vec<String>, Vec<String>)>,
    cur_raw: Vec<String>,
    cur_stem: Vec<String>,
    // insertion order doubles as the deterministic tie order
    adjoined: Vec<([String; 3], u64)>,
    adjoint_index: HashMap<[String; 3], usize>,
}

impl KeyphraseExtractor {
    /// Creates an extractor with the given stop set and phrase-length cap.
    pub fn new(stops: StopWords, ngram_cap: usize) -> Self {
        Self {
            stops,
            ngram_cap: ngram_cap.max(2),
            completed: Vec::new(),
            cur_raw: Vec::new(),
            cur_stem: Vec::new(),
            adjoined: Vec::new(),
            adjoint_index: HashMap::new(),
        }
    }

    /// Consumes one advance: `token` is the newly accepted sanitized token
    /// and `window` is the context window after the push.
    pub fn observe(&mut self, token: &str, window: &[String]) {
        if self.stops.contains(token) {
            self.close_phrase();
        } else {
            let stemmed = stem(token);
            if !stemmed.is_empty() {
                self.cur_raw.push(token.to_string());
                self.cur_stem.push(stemmed);
                if self.cur_raw.len() >= self.ngram_cap {
                    self.close_phrase();
                }
            }
        }

        // Adjoint triples: the newest 3-token window, counted once per
        // position. Outer tokens must be non-stop-words; the center may be
        // anything.
        if window.len() >= 3 {
            let n = window.len();
            let (l, c, r) = (&window[n - 3], &window[n - 2], &window[n - 1]);
            if !self.stops.contains(l) && !self.stops.contains(r) {
                let key = [l.clone(), c.clone(), r.clone()];
                match self.adjoint_index.get(&key) {
                    Some(&i) => self.adjoined[i].1 += 1,
                    None => {
                        self.adjoint_index.insert(key.clone(), self.adjoined.len());
                        self.adjoined.push((key, 1));
                    }
                }
            }
        }
    }

    fn close_phrase(&mut self) {
        if self.cur_raw.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.cur_raw);
        let stems = std::mem::take(&mut self.cur_stem);
        self.completed.push((raw, stems));
    }

    /// Completed phrases so far, raw forms.
    pub fn phrases(&self) -> impl Iterator<Item = &[String]> {
        self.completed.iter().map(|(raw, _)| raw.as_slice())
    }

    /// Observed adjoint triples with their counts.
    pub fn adjoints(&self) -> impl Iterator<Item = (&[String; 3], u64)> {
        self.adjoined.iter().map(|(t, c)| (t, *c))
    }

    /// Scores everything against the window's centrality vector and
    /// succession affinity, closing any open phrase buffer first.
    ///
    /// A single-token phrase scores as pure centrality of its raw form; a
    /// multi-token phrase adds the succession affinity between each pair of
    /// consecutive stems and divides the total by (length - 1). An adjoint
    /// scores `(centrality(left) + centrality(right)) * ln(1 + count)`.
    /// Ties preserve first-occurrence order (stable sort).
    pub fn finalize(mut self, graph: &CooccurrenceGraph, centrality: &[f64]) -> KeyphraseRanking {
        self.close_phrase();
        let dict = graph.dictionary();
        let succession = graph.succession_affinity();
        let rank = |token: &str| -> f64 {
            dict.get(token)
                .and_then(|i| centrality.get(i as usize))
                .copied()
                .unwrap_or(0.0)
        };

        let mut ranking = KeyphraseRanking::default();
        for (raw, stems) in &self.completed {
            let mut score = rank(&raw[0]);
            if raw.len() > 1 {
                for pair in stems.windows(2) {
                    if let (Some(i), Some(j)) = (dict.get(&pair[0]), dict.get(&pair[1])) {
                        score += succession.get(i, j);
                    }
                }
                score /= (raw.len() - 1) as f64;
            }
            let scored = ScoredPhrase {
                tokens: raw.clone(),
                score,
            };
            if raw.len() > 1 {
                ranking.phrases.push(scored);
            } else {
                ranking.keywords.push(scored);
            }
        }
        for (triple, count) in &self.adjoined {
            let score = (rank(&triple[0]) + rank(&triple[2])) * (1.0 + *count as f64).ln();
            ranking.keywords.push(ScoredPhrase {
                tokens: triple.to_vec(),
                score,
            });
        }

        let descending =
            |a: &ScoredPhrase, b: &ScoredPhrase| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal);
        ranking.phrases.sort_by(descending);
        ranking.keywords.sort_by(descending);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{centrality, CentralityConfig, CooccurrenceGraph};

    /// Drives tokens through a graph and extractor the way the pipeline
    /// does: push into a sliding window, observe both.
    fn run(tokens: &[&str], span: usize, stops: StopWords) -> (CooccurrenceGraph, KeyphraseExtractor) {
        let mut graph = CooccurrenceGraph::new(span);
        let mut extractor = KeyphraseExtractor::new(stops, span);
        let mut window: Vec<String> = Vec::new();
        for t in tokens {
            if window.len() == span {
                window.remove(0);
            }
            window.push(t.to_string());
            graph.observe(&window);
            extractor.observe(t, &window);
        }
        (graph, extractor)
    }

    #[test]
    fn test_phrases_split_on_stop_words() {
        let stops = StopWords::new(&["the", "a"]);
        let (_, extractor) = run(
            &["the", "quick", "brown", "fox", "jumps", "the", "lazy", "dog"],
            3,
            stops,
        );
        let phrases: Vec<Vec<String>> = extractor.phrases().map(<[String]>::to_vec).collect();
        // cap = span = 3: "quick brown fox" closes at the cap, "jumps"
        // closes at the second "the", "lazy dog" remains open until finalize
        assert!(phrases.contains(&vec![
            "quick".to_string(),
            "brown".to_string(),
            "fox".to_string()
        ]));
        assert!(phrases.contains(&vec!["jumps".to_string()]));
    }

    #[test]
    fn test_no_phrase_contains_a_stop_word() {
        let stops = StopWords::nltk();
        let (graph, extractor) = run(
            &[
                "we", "built", "a", "semantic", "index", "over", "the", "chat", "history",
            ],
            3,
            stops.clone(),
        );
        let scores = centrality(&graph.affinity(), CentralityConfig::default());
        let ranking = extractor.finalize(&graph, &scores);
        for phrase in ranking.phrases.iter() {
            for token in &phrase.tokens {
                assert!(!stops.contains(token), "stop-word {token:?} in phrase");
            }
        }
    }

    #[test]
    fn test_adjoint_outer_tokens_are_non_stop() {
        let stops = StopWords::nltk();
        let (_, extractor) = run(
            &["state", "of", "the", "art", "state", "of", "the", "art"],
            3,
            stops.clone(),
        );
        for (triple, _) in extractor.adjoints() {
            assert!(!stops.contains(&triple[0]));
            assert!(!stops.contains(&triple[2]));
        }
    }

    #[test]
    fn test_repeated_adjoints_accumulate_counts() {
        let stops = StopWords::new(&["of"]);
        let (_, extractor) = run(
            &["state", "of", "art", "state", "of", "art"],
            3,
            stops,
        );
        let counts: Vec<u64> = extractor
            .adjoints()
            .filter(|(t, _)| t[0] == "state" && t[2] == "art")
            .map(|(_, c)| c)
            .collect();
        assert_eq!(counts, vec![2]);
    }

    #[test]
    fn test_ngram_cap_closes_phrase() {
        let stops = StopWords::new(&["the"]);
        let (_, extractor) = run(&["alpha", "beta", "gamma", "delta"], 3, stops);
        let phrases: Vec<usize> = extractor.phrases().map(<[String]>::len).collect();
        // cap 3 forces a close after gamma; delta stays buffered
        assert_eq!(phrases, vec![3]);
    }

    #[test]
    fn test_finalize_ranks_descending() {
        let stops = StopWords::nltk();
        let (graph, extractor) = run(
            &[
                "graph", "centrality", "ranks", "graph", "tokens", "by", "importance",
            ],
            3,
            stops,
        );
        let scores = centrality(&graph.affinity(), CentralityConfig::default());
        let ranking = extractor.finalize(&graph, &scores);
        for pair in ranking.phrases.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for pair in ranking.keywords.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_adjoint_score_grows_with_count() {
        let stops = StopWords::new(&["of"]);
        let once = {
            let (graph, extractor) = run(&["state", "of", "art"], 3, StopWords::new(&["of"]));
            let scores = centrality(&graph.affinity(), CentralityConfig::default());
            extractor
                .finalize(&graph, &scores)
                .keywords
                .iter()
                .find(|p| p.tokens.len() == 3)
                .map(|p| p.score)
                .unwrap()
        };
        let twice = {
            let (graph, extractor) = run(&["state", "of", "art", "state", "of", "art"], 3, stops);
            let scores = centrality(&graph.affinity(), CentralityConfig::default());
            extractor
                .finalize(&graph, &scores)
                .keywords
                .iter()
                .find(|p| p.tokens.len() == 3)
                .map(|p| p.score)
                .unwrap()
        };
        assert!(twice > once, "twice={twice} once={once}");
    }

    #[test]
    fn test_single_token_scores_as_pure_centrality() {
        let stops = StopWords::new(&["the"]);
        let (graph, extractor) = run(&["the", "nexus", "the"], 3, stops);
        let scores = centrality(&graph.affinity(), CentralityConfig::default());
        let dict_idx = graph.dictionary().get("nexus").unwrap() as usize;
        let expected = scores[dict_idx];
        let ranking = extractor.finalize(&graph, &scores);
        let single = ranking
            .keywords
            .iter()
            .find(|p| p.tokens == ["nexus"])
            .unwrap();
        assert!((single.score - expected).abs() < 1e-12);
    }
}
