//! Stop-word set for phrase segmentation.

use std::collections::HashSet;

use super::stem;

/// NLTK-generated list of English stop-words.
pub const NLTK_STOPS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// A stop-word set holding both the configured entries and their stemmed
/// forms, since stemmed and raw tokens both appear as keys elsewhere.
#[derive(Debug, Clone)]
pub struct StopWords {
    set: HashSet<String>,
}

impl StopWords {
    /// Builds a set from a word list, adding the stem of every entry.
    pub fn new(words: &[&str]) -> Self {
        let mut set = HashSet::with_capacity(words.len() * 2);
        for &w in words {
            set.insert(w.to_string());
            set.insert(stem(w));
        }
        Self { set }
    }

    /// The default NLTK set.
    pub fn nltk() -> Self {
        Self::new(NLTK_STOPS)
    }

    /// Whether `token` (raw or stemmed) is a stop-word.
    pub fn contains(&self, token: &str) -> bool {
        self.set.contains(token)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::nltk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_raw_and_stemmed_forms() {
        let stops = StopWords::nltk();
        assert!(stops.contains("the"));
        assert!(stops.contains("having"));
        // stem of "having"
        assert!(stops.contains("have"));
        assert!(!stops.contains("fox"));
    }

    #[test]
    fn test_custom_list() {
        let stops = StopWords::new(&["foo", "bar"]);
        assert!(stops.contains("foo"));
        assert!(!stops.contains("the"));
    }
}
