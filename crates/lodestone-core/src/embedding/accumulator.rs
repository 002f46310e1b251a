//! Running-mean vector accumulator.

use crate::error::EmbedError;

/// A lazily allocated running mean over fixed-dimension vectors.
///
/// "No samples yet" is a distinct state from "zero vector": the sum is
/// unset until the first sample arrives, and finalizing with zero samples
/// is an explicit error rather than a division by zero.
#[derive(Debug, Clone, Default)]
pub struct RunningMean {
    sum: Option<Vec<f32>>,
    count: usize,
}

impl RunningMean {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates one sample by vector addition. The first sample fixes
    /// the dimension.
    pub fn add(&mut self, sample: &[f32]) {
        match &mut self.sum {
            None => {
                self.sum = Some(sample.to_vec());
            }
            Some(sum) => {
                debug_assert_eq!(sum.len(), sample.len());
                for (acc, &x) in sum.iter_mut().zip(sample.iter()) {
                    *acc += x;
                }
            }
        }
        self.count += 1;
    }

    /// Samples accumulated so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The current mean without consuming the accumulator.
    pub fn mean(&self) -> Option<Vec<f32>> {
        let sum = self.sum.as_ref()?;
        let scale = 1.0 / self.count as f32;
        Some(sum.iter().map(|&x| x * scale).collect())
    }

    /// Consumes the accumulated samples into their mean and resets to the
    /// unset state for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::EmptyAccumulator`] when no samples were ever
    /// accumulated.
    pub fn finalize(&mut self) -> Result<Vec<f32>, EmbedError> {
        let mean = self.mean().ok_or(EmbedError::EmptyAccumulator)?;
        self.sum = None;
        self.count = 0;
        Ok(mean)
    }
}
