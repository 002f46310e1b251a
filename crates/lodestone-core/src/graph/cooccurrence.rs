//! Windowed cooccurrence statistics and the derived sparse affinity matrix.

use std::collections::HashMap;

/// Append-only token-to-index dictionary.
///
/// A token's index never changes once assigned; the matrix dimension grows
/// with the vocabulary seen in the current session, not the global
/// vocabulary. Keys are raw (sanitized but unstemmed) tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenDictionary {
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl TokenDictionary {
    /// Returns the index for `token`, assigning the next free index on
    /// first sight.
    pub fn intern(&mut self, token: &str) -> u32 {
        if let Some(&idx) = self.index.get(token) {
            return idx;
        }
        let idx = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.index.insert(token.to_string(), idx);
        idx
    }

    /// Looks up a token without assigning an index.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// The token assigned to `idx`, if any.
    pub fn token(&self, idx: u32) -> Option<&str> {
        self.tokens.get(idx as usize).map(String::as_str)
    }

    /// Number of distinct tokens seen this session.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens have been seen.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Sparse token-by-token affinity matrix.
///
/// Entries exist only for pairs with nonzero underlying counts; absent
/// entries read as zero. The symmetric variant stores both (i, j) and
/// (j, i); the succession variant is directional.
#[derive(Debug, Clone)]
pub struct AffinityMatrix {
    n: usize,
    entries: HashMap<(u32, u32), f64>,
}

impl AffinityMatrix {
    /// Matrix dimension (distinct tokens seen this session).
    pub fn dim(&self) -> usize {
        self.n
    }

    /// The affinity between token indices `i` and `j`; zero when no entry
    /// exists.
    pub fn get(&self, i: u32, j: u32) -> f64 {
        self.entries.get(&(i, j)).copied().unwrap_or(0.0)
    }

    /// Iterates the stored (row, col, value) entries.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.entries.iter().map(|(&(i, j), &v)| (i, j, v))
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Accumulates windowed token statistics.
///
/// On each advance, every token pair currently in the window (not only the
/// newest token) updates three counters with window-size-normalized
/// increments:
///
/// - unigram frequency: +1/span per window position
/// - symmetric cooccurrence: +1/span per unordered position pair
/// - directional succession: +1/(span-1) per ordered (earlier, later) pair
#[derive(Debug, Clone)]
pub struct CooccurrenceGraph {
    span: usize,
    dict: TokenDictionary,
    freqs: Vec<f64>,
    coocs: HashMap<(u32, u32), f64>,
    succs: HashMap<(u32, u32), f64>,
}

impl CooccurrenceGraph {
    /// Creates a graph for a sliding window of `span` tokens.
    pub fn new(span: usize) -> Self {
        Self {
            span: span.max(2),
            dict: TokenDictionary::default(),
            freqs: Vec::new(),
            coocs: HashMap::new(),
            succs: HashMap::new(),
        }
    }

    /// Folds the current window contents into the counters.
    ///
    /// Called once per advance, after the window has been updated.
    pub fn observe(&mut self, window: &[String]) {
        let span = self.span as f64;
        let ids: Vec<u32> = window.iter().map(|t| self.intern(t)).collect();
        for (i, &ti) in ids.iter().enumerate() {
            self.freqs[ti as usize] += 1.0 / span;
            for &tj in &ids[i + 1..] {
                let key = if ti <= tj { (ti, tj) } else { (tj, ti) };
                *self.coocs.entry(key).or_insert(0.0) += 1.0 / span;
                *self.succs.entry((ti, tj)).or_insert(0.0) += 1.0 / (span - 1.0);
            }
        }
    }

    fn intern(&mut self, token: &str) -> u32 {
        let idx = self.dict.intern(token);
        if idx as usize >= self.freqs.len() {
            self.freqs.resize(idx as usize + 1, 0.0);
        }
        idx
    }

    /// The session dictionary backing the counters.
    pub fn dictionary(&self) -> &TokenDictionary {
        &self.dict
    }

    /// Unigram frequency of a token index.
    pub fn frequency(&self, idx: u32) -> f64 {
        self.freqs.get(idx as usize).copied().unwrap_or(0.0)
    }

    /// Symmetric cooccurrence count for a token pair.
    pub fn cooccurrence(&self, i: u32, j: u32) -> f64 {
        let key = if i <= j { (i, j) } else { (j, i) };
        self.coocs.get(&key).copied().unwrap_or(0.0)
    }

    /// Derives the symmetric affinity matrix:
    /// `affinity(t, w) = cooc(t, w) / (freq(t) + freq(w))`.
    ///
    /// Pairs with zero cooccurrence are omitted, so no entry is ever
    /// computed with a zero denominator.
    pub fn affinity(&self) -> AffinityMatrix {
        let mut entries = HashMap::with_capacity(self.coocs.len() * 2);
        for (&(i, j), &c) in &self.coocs {
            if c <= 0.0 {
                continue;
            }
            let denom = self.freqs[i as usize] + self.freqs[j as usize];
            let a = c / denom;
            entries.insert((i, j), a);
            entries.insert((j, i), a);
        }
        AffinityMatrix {
            n: self.dict.len(),
            entries,
        }
    }

    /// Derives the directional succession affinity:
    /// `affinity(t, w) = succ(t, w) / (freq(t) + freq(w))`, biased toward
    /// "t tends to precede w".
    pub fn succession_affinity(&self) -> AffinityMatrix {
        let mut entries = HashMap::with_capacity(self.succs.len());
        for (&(i, j), &s) in &self.succs {
            if s <= 0.0 {
                continue;
            }
            let denom = self.freqs[i as usize] + self.freqs[j as usize];
            entries.insert((i, j), s / denom);
        }
        AffinityMatrix {
            n: self.dict.len(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn slide(graph: &mut CooccurrenceGraph, tokens: &[&str], span: usize) {
        let mut buf: Vec<String> = Vec::new();
        for t in tokens {
            if buf.len() == span {
                buf.remove(0);
            }
            buf.push(t.to_string());
            graph.observe(&buf);
        }
    }

    #[test]
    fn test_dictionary_is_append_only() {
        let mut dict = TokenDictionary::default();
        let a = dict.intern("alpha");
        let b = dict.intern("beta");
        assert_eq!(dict.intern("alpha"), a);
        assert_eq!(dict.get("beta"), Some(b));
        assert_eq!(dict.token(a), Some("alpha"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_window_counters_concrete_scenario() {
        // span=3 over "the quick brown fox jumps the lazy dog": after the
        // full pass, the window {quick, brown, fox} has contributed 1/3 to
        // each of its unigrams and each of its pairs exactly once.
        let mut graph = CooccurrenceGraph::new(3);
        slide(
            &mut graph,
            &["the", "quick", "brown", "fox", "jumps", "the", "lazy", "dog"],
            3,
        );
        let dict = graph.dictionary();
        let quick = dict.get("quick").unwrap();
        let brown = dict.get("brown").unwrap();
        let fox = dict.get("fox").unwrap();
        let dog = dict.get("dog").unwrap();

        // "quick" appears in windows ending at quick, brown, fox: 3 * 1/3
        assert!((graph.frequency(quick) - 1.0).abs() < 1e-9);
        // (quick, brown) cooccur in windows ending at brown and fox: 2 * 1/3
        assert!((graph.cooccurrence(quick, brown) - 2.0 / 3.0).abs() < 1e-9);
        // (quick, fox) cooccur only in the window {quick, brown, fox}
        assert!((graph.cooccurrence(quick, fox) - 1.0 / 3.0).abs() < 1e-9);
        // "dog" only appears in the final window
        assert!((graph.frequency(dog) - 1.0 / 3.0).abs() < 1e-9);
        // never-cooccurring pair reads zero
        assert_eq!(graph.cooccurrence(quick, dog), 0.0);
    }

    #[test]
    fn test_affinity_is_sparse_and_symmetric() {
        let mut graph = CooccurrenceGraph::new(3);
        graph.observe(&window(&["a", "b"]));
        let aff = graph.affinity();
        let dict = graph.dictionary();
        let (a, b) = (dict.get("a").unwrap(), dict.get("b").unwrap());
        assert!(aff.get(a, b) > 0.0);
        assert_eq!(aff.get(a, b), aff.get(b, a));
        // only the (a, b) pair exists, stored in both orientations
        assert_eq!(aff.nnz(), 2);
    }

    #[test]
    fn test_affinity_formula() {
        let mut graph = CooccurrenceGraph::new(3);
        graph.observe(&window(&["a", "b"]));
        let dict = graph.dictionary();
        let (a, b) = (dict.get("a").unwrap(), dict.get("b").unwrap());
        let expect = graph.cooccurrence(a, b) / (graph.frequency(a) + graph.frequency(b));
        assert!((graph.affinity().get(a, b) - expect).abs() < 1e-12);
    }

    #[test]
    fn test_succession_is_directional() {
        let mut graph = CooccurrenceGraph::new(3);
        graph.observe(&window(&["first", "second"]));
        let dict = graph.dictionary();
        let (f, s) = (dict.get("first").unwrap(), dict.get("second").unwrap());
        let succ = graph.succession_affinity();
        assert!(succ.get(f, s) > 0.0);
        assert_eq!(succ.get(s, f), 0.0);
    }

    #[test]
    fn test_repeated_token_pairs_key_to_self() {
        // the same token at two window positions still produces a counted pair
        let mut graph = CooccurrenceGraph::new(3);
        graph.observe(&window(&["echo", "echo"]));
        let dict = graph.dictionary();
        let e = dict.get("echo").unwrap();
        assert!(graph.cooccurrence(e, e) > 0.0);
    }
}
