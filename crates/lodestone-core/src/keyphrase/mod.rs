//! RAKE-style keyphrase extraction.
//!
//! Phrases are segmented by stop-word boundaries in the same streaming pass
//! that feeds the cooccurrence graph, "adjoint" triples capture short
//! phrases broken only by a transient filler token, and both are scored
//! against the window's centrality ranking and affinity matrix.

mod extractor;
mod stopwords;

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};

pub use extractor::{KeyphraseExtractor, KeyphraseRanking, ScoredPhrase};
pub use stopwords::{StopWords, NLTK_STOPS};

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Snowball-stems a token.
pub fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}
