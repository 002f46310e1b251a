//! Streaming lexical pipeline: sanitization, tokenizing, and the bounded
//! sliding window.
//!
//! Raw text is split on whitespace and each raw token passes through a
//! [`SanitizerChain`] before reaching any stateful component; an empty
//! sanitized token is dropped on the spot. The [`Spanner`] maintains the
//! sliding context window and delegates the continue/stop decision to its
//! wrapped [`Lexer`].

mod sanitize;
mod spanner;

pub use sanitize::{SanitizerChain, Transform};
pub use spanner::{lex_text, Lexer, Spanner};
