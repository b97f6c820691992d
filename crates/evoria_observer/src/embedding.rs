//! The optional embedding service (spec §6/§9): similarity blending falls
//! back to structured features alone when this is absent or errors, with
//! no downstream caller needing to branch on which.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Default when no embedding backend is configured. Every blending call
/// site must treat `None` as "use structured features only", never as an
/// error to propagate.
pub struct NoEmbeddingService;

#[async_trait]
impl EmbeddingService for NoEmbeddingService {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(crate::error::ObserverError::validation("no embedding backend configured"))
    }
}

/// Blends a structured-feature distance with an optional embedding
/// cosine distance; degrades to the structured term alone when `embedding`
/// is `None` (spec §9's graceful-degradation requirement).
pub fn blend_distance(structured_distance: f32, embedding_distance: Option<f32>, embedding_weight: f32) -> f32 {
    match embedding_distance {
        Some(e) => structured_distance * (1.0 - embedding_weight) + e * embedding_weight,
        None => structured_distance,
    }
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(1.0 - dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_embedding_service_errors() {
        let svc = NoEmbeddingService;
        assert!(svc.embed(&["a".to_string()]).await.is_err());
    }

    #[test]
    fn blend_falls_back_without_embedding() {
        assert_eq!(blend_distance(0.4, None, 0.3), 0.4);
    }

    #[test]
    fn blend_mixes_when_embedding_present() {
        let blended = blend_distance(0.4, Some(0.0), 0.5);
        assert!((blended - 0.2).abs() < 1e-6);
    }

    #[test]
    fn cosine_distance_of_identical_vectors_is_zero() {
        let v = vec![1.0, 2.0, 3.0];
        assert!(cosine_distance(&v, &v).unwrap() < 1e-6);
    }
}
