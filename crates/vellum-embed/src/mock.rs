//! Test-only mock embedder.

use crate::error::EmbedError;
use crate::provider::Embedder;

/// Deterministic embedder for tests and the offline `memory` backend.
///
/// Vectors are byte histograms rather than a constant, so distinct texts
/// embed in distinct directions and ranking paths can be exercised.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimension: u64,
    pub fail: bool,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimension: 16,
            fail: false,
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.fail {
            return Err(EmbedError::Request("mock embed failure".into()));
        }

        let dim = usize::try_from(self.dimension)
            .map_err(|e| EmbedError::Request(e.to_string()))?;
        let mut vector = vec![0.0f32; dim];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % dim] += f32::from(byte) / 255.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> u64 {
        self.dimension
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &'static str {
        "mock"
    }
}
