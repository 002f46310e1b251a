//! Pure token normalization.
//!
//! A [`SanitizerChain`] applies an ordered sequence of independent
//! transforms. Sanitization never fails: it always returns a string,
//! possibly empty, and callers treat the empty result as "discard this
//! token."

use serde::{Deserialize, Serialize};

/// A single pure text transform.
///
/// Transforms form a small closed set rather than an open trait so the chain
/// stays a plain value: cheap to clone into every worker and trivially
/// comparable in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Strip leading and trailing characters that are neither letters nor
    /// digits.
    TrimNonAlnum,
    /// Lowercase the token.
    Lowercase,
}

impl Transform {
    fn apply(&self, token: &str) -> String {
        match self {
            Transform::TrimNonAlnum => token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_string(),
            Transform::Lowercase => token.to_lowercase(),
        }
    }
}

/// An ordered chain of [`Transform`]s.
///
/// An empty chain is the identity. The default chain strips punctuation and
/// lowercases, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerChain {
    transforms: Vec<Transform>,
}

impl SanitizerChain {
    /// Creates a chain from an explicit transform sequence.
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    /// The identity chain.
    pub fn identity() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Applies every transform in order.
    ///
    /// Always returns a string; the result may be empty and must then be
    /// discarded by the caller before it reaches any stateful component.
    pub fn sanitize(&self, token: &str) -> String {
        let mut out = token.to_string();
        for transform in &self.transforms {
            out = transform.apply(&out);
        }
        out
    }
}

impl Default for SanitizerChain {
    fn default() -> Self {
        Self {
            transforms: vec![Transform::TrimNonAlnum, Transform::Lowercase],
        }
    }
}
