//! Read-only token-to-vector lookup.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::VocabError;

/// Read-only vocabulary contract: the core depends only on `lookup` and
/// `dim`, not on any particular on-disk layout.
pub trait EmbeddingStore: Send + Sync {
    /// Embedding dimension D, fixed for the process lifetime.
    fn dim(&self) -> usize;
    /// Number of vocabulary entries.
    fn len(&self) -> usize;
    /// The vector for `token`, or `None` when the token is out of
    /// vocabulary.
    fn lookup(&self, token: &str) -> Option<&[f32]>;
    /// Whether the vocabulary is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory embedding table loaded once at startup.
///
/// # Binary layout
///
/// An ASCII header `"<word count> <dimension>\n"` followed by, per entry, a
/// whitespace-terminated token and D little-endian 32-bit floats (the
/// word2vec binary format).
#[derive(Debug)]
pub struct EmbeddingTable {
    entries: HashMap<String, Vec<f32>>,
    dim: usize,
}

impl EmbeddingTable {
    /// Builds a table from explicit entries. Used by tests and by callers
    /// that assemble vocabularies programmatically.
    pub fn from_entries(dim: usize, entries: HashMap<String, Vec<f32>>) -> Self {
        debug_assert!(entries.values().all(|v| v.len() == dim));
        Self { entries, dim }
    }

    /// Loads the binary vocabulary at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VocabError`] on I/O failure, a malformed header, or a file
    /// that ends before the declared entry count — all fatal at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VocabError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let table = Self::read_binary(&mut reader)?;
        info!(
            words = table.len(),
            dim = table.dim(),
            path = %path.as_ref().display(),
            "loaded embedding table"
        );
        Ok(table)
    }

    /// Reads the binary layout from any `Read` source.
    pub fn read_binary(reader: &mut impl Read) -> Result<Self, VocabError> {
        let header = read_line(reader)?;
        let mut parts = header.split_whitespace();
        let word_count: usize = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| VocabError::InvalidHeader(header.clone()))?;
        let dim: usize = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| VocabError::InvalidHeader(header.clone()))?;
        if dim == 0 {
            return Err(VocabError::InvalidHeader(header));
        }

        let mut entries = HashMap::with_capacity(word_count);
        let mut payload = vec![0u8; dim * 4];
        for read_so_far in 0..word_count {
            let token = match read_token(reader)? {
                Some(t) => t,
                None => {
                    return Err(VocabError::Truncated {
                        expected: word_count,
                        read: read_so_far,
                    })
                }
            };
            reader.read_exact(&mut payload).map_err(|_| VocabError::Truncated {
                expected: word_count,
                read: read_so_far,
            })?;
            let vector: Vec<f32> = payload
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            entries.insert(token, vector);
        }
        Ok(Self { entries, dim })
    }
}

impl EmbeddingStore for EmbeddingTable {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn lookup(&self, token: &str) -> Option<&[f32]> {
        self.entries.get(token).map(Vec::as_slice)
    }
}

/// Reads bytes up to and including the first newline.
fn read_line(reader: &mut impl Read) -> Result<String, VocabError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    String::from_utf8(line).map_err(|e| VocabError::InvalidHeader(e.to_string()))
}

/// Reads the next whitespace-terminated token, skipping leading whitespace.
/// Returns `None` at end of input.
fn read_token(reader: &mut impl Read) -> Result<Option<String>, VocabError> {
    let mut token = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        if byte[0].is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(byte[0]);
    }
    if token.is_empty() {
        return Ok(None);
    }
    String::from_utf8(token)
        .map(Some)
        .map_err(|e| VocabError::InvalidHeader(e.to_string()))
}
