//! The fixed linear correction applied to pooled embeddings.
//!
//! Additive/mean composition systematically distorts document vectors
//! relative to native single-word embeddings; this precomputed D-by-D
//! matrix compensates. It is fit offline and treated here as an opaque
//! injected constant, applied identically to every finalized document
//! vector and every query vector.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::VocabError;

/// A dense D-by-D linear operator, row-major.
#[derive(Debug, Clone)]
pub struct InductionMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl InductionMatrix {
    /// The identity operator: mean pooling passes through uncorrected.
    /// Used in tests and when no fitted matrix is supplied.
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { dim, data }
    }

    /// Builds a matrix from explicit row-major data.
    pub fn from_rows(dim: usize, data: Vec<f32>) -> Result<Self, VocabError> {
        if data.len() != dim * dim {
            return Err(VocabError::MatrixSizeMismatch {
                expected: dim * dim,
                actual: data.len(),
            });
        }
        Ok(Self { dim, data })
    }

    /// Loads D*D little-endian 32-bit floats from `path`.
    pub fn load(path: impl AsRef<Path>, dim: usize) -> Result<Self, VocabError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        if raw.len() != dim * dim * 4 {
            return Err(VocabError::MatrixSizeMismatch {
                expected: dim * dim,
                actual: raw.len() / 4,
            });
        }
        let data = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self { dim, data })
    }

    /// Operator dimension D.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Applies the operator: `A * v`.
    pub fn apply(&self, v: &[f32]) -> Vec<f32> {
        debug_assert_eq!(v.len(), self.dim);
        let mut out = vec![0.0f32; self.dim];
        for (i, row) in self.data.chunks_exact(self.dim).enumerate() {
            out[i] = row.iter().zip(v.iter()).map(|(&a, &x)| a * x).sum();
        }
        out
    }
}
