//! Query encoder: question text to a unit-norm vector

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

/// Text encoded once at startup to learn the model's output dimension
pub const SENTINEL: &str = "test";

/// Wraps an embedding provider and L2-normalizes its output, so inner-product
/// search over a normalized index yields cosine similarity
pub struct QueryEncoder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl QueryEncoder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Encode a query into a unit-norm vector
    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = self.provider.embed(text).await?;
        if vector.is_empty() {
            return Err(Error::embedding(format!(
                "{} returned an empty vector",
                self.provider.name()
            )));
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    /// Encode the sentinel and compare its dimension with the index
    ///
    /// Run once before serving; a mismatch means the model and the index were
    /// built incompatibly.
    pub async fn self_check(&self, index_dimension: usize) -> Result<usize> {
        let sample = self.encode(SENTINEL).await?;
        if sample.len() != index_dimension {
            return Err(Error::DimensionMismatch {
                encoder: sample.len(),
                index: index_dimension,
            });
        }
        tracing::info!(
            "Query encoder {} ({}) matches index dimension {}",
            self.provider.name(),
            self.provider.model(),
            index_dimension
        );
        Ok(sample.len())
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

/// Scale a vector to unit length; zero vectors are left as-is
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubEmbedder;

    #[tokio::test]
    async fn test_encode_is_unit_norm() {
        let encoder = QueryEncoder::new(Arc::new(
            StubEmbedder::new(2).with("bel", vec![3.0, 4.0]),
        ));

        let v = encoder.encode("bel").await.unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_encode_is_deterministic() {
        let encoder = QueryEncoder::new(Arc::new(StubEmbedder::new(8)));
        let a = encoder.encode("Migren atağı").await.unwrap();
        let b = encoder.encode("Migren atağı").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_self_check_dimension_mismatch() {
        let encoder = QueryEncoder::new(Arc::new(StubEmbedder::new(3)));
        assert_eq!(encoder.self_check(3).await.unwrap(), 3);
        assert!(matches!(
            encoder.self_check(4).await,
            Err(Error::DimensionMismatch { encoder: 3, index: 4 })
        ));
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }
}
