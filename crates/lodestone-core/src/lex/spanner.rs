//! Tokenizing with a bounded sliding window.

use super::sanitize::SanitizerChain;

/// Continue/stop policy for a token stream.
///
/// A closed set of variants: `Pass` accepts every token; `Counted` stops the
/// scan once a configured number of tokens has been accepted. Stopping
/// terminates the scan early, which is how each document window is capped at
/// a target size without buffering the whole input.
#[derive(Debug, Clone)]
pub enum Lexer {
    /// Accept every token.
    Pass,
    /// Accept up to `max` tokens, then stop.
    Counted {
        /// Tokens accepted so far.
        seen: usize,
        /// Maximum tokens to accept.
        max: usize,
    },
}

impl Lexer {
    /// A count-bounded lexer that stops after `max` accepted tokens.
    pub fn counted(max: usize) -> Self {
        Lexer::Counted { seen: 0, max }
    }

    /// Records one accepted token and reports whether to keep consuming.
    pub fn advance(&mut self) -> bool {
        match self {
            Lexer::Pass => true,
            Lexer::Counted { seen, max } => {
                *seen += 1;
                *seen < *max
            }
        }
    }

    /// Tokens accepted so far.
    pub fn seen(&self) -> usize {
        match self {
            Lexer::Pass => 0,
            Lexer::Counted { seen, .. } => *seen,
        }
    }
}

/// A sanitizing tokenizer that maintains the last `span` tokens seen.
///
/// `advance` pushes the sanitized token into a FIFO window of fixed capacity
/// and delegates the continue/stop decision to the wrapped [`Lexer`]. Empty
/// sanitized tokens never reach the window.
#[derive(Debug, Clone)]
pub struct Spanner {
    chain: SanitizerChain,
    lexer: Lexer,
    span: usize,
    window: Vec<String>,
}

impl Spanner {
    /// Creates a spanner with a window of `span` tokens.
    pub fn new(span: usize, chain: SanitizerChain, lexer: Lexer) -> Self {
        Self {
            chain,
            lexer,
            span: span.max(1),
            window: Vec::with_capacity(span.max(1)),
        }
    }

    /// Sanitizes a raw token, returning `None` for tokens that must be
    /// discarded.
    pub fn sanitize(&self, raw: &str) -> Option<String> {
        let token = self.chain.sanitize(raw);
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// Pushes a sanitized token into the window, evicting the oldest entry
    /// on overflow, and returns whether the scan should continue.
    pub fn advance(&mut self, token: String) -> bool {
        debug_assert!(!token.is_empty(), "empty token reached the window");
        if self.window.len() == self.span {
            self.window.remove(0);
        }
        self.window.push(token);
        self.lexer.advance()
    }

    /// The current window contents, oldest first.
    pub fn window(&self) -> &[String] {
        &self.window
    }

    /// Window capacity fixed at construction.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Tokens accepted by the wrapped lexer.
    pub fn accepted(&self) -> usize {
        self.lexer.seen()
    }
}

/// Drives a spanner over whitespace-delimited text.
///
/// An explicit loop over the token stream: recursion depth never scales with
/// document length. Returns `false` once the lexer stops the scan; remaining
/// tokens in `text` are not consumed.
pub fn lex_text<F>(text: &str, mut advance: F) -> bool
where
    F: FnMut(&str) -> bool,
{
    for raw in text.split_whitespace() {
        if !advance(raw) {
            return false;
        }
    }
    true
}
