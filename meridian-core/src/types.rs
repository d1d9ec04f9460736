// ABOUTME: Cross-cutting types shared by the retrieval backends and the orchestrator
// ABOUTME: Kept deliberately small: each backend crate owns its own richer result types

use serde::{Deserialize, Serialize};

/// The backend a citation (or a fan-out result) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    Vector,
    Graph,
    Ess,
}

impl std::fmt::Display for CitationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Vector => "vector",
            Self::Graph => "graph",
            Self::Ess => "ess",
        };
        write!(f, "{s}")
    }
}

/// A single supporting reference attached to a synthesized answer. Every
/// citation must be traceable back to a source row that belongs to the
/// caller's tenant (Testable Property 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub kind: CitationKind,
    pub source: String,
    pub score: Option<f32>,
    pub id: String,
}

impl Citation {
    #[must_use]
    pub fn new(kind: CitationKind, source: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            score: None,
            id: id.into(),
        }
    }

    #[must_use]
    pub const fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Confidence label for a synthesized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryHigh,
    High,
    Medium,
    Low,
    None,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::VeryHigh => "very_high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        };
        write!(f, "{s}")
    }
}

/// A fixed-dimension embedding vector. A thin newtype rather than a bare
/// `Vec<f32>` so the embedding-dimension invariant can be checked
/// at construction sites instead of re-validated ad hoc everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity against another embedding of the same dimension.
    /// Returns `0.0` for mismatched dimensions or zero-norm vectors rather
    /// than panicking; callers that need a hard dimension check use
    /// `EmbeddingDim::validate` instead.
    #[must_use]
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return 0.0;
        }
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norm_a: f32 = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b: f32 = other.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

/// Process-wide fixed embedding dimension. A mismatch between a document's
/// embedding and this dimension rejects the ingest rather than truncating
/// or padding the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingDim(pub usize);

impl EmbeddingDim {
    pub const DEFAULT: Self = Self(768);

    /// # Errors
    /// Returns an error message if `embedding`'s length does not match.
    pub fn validate(self, embedding: &Embedding) -> Result<(), String> {
        if embedding.dim() != self.0 {
            return Err(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.0,
                embedding.dim()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let a = Embedding::new(vec![1.0, 2.0, 3.0]);
        let b = Embedding::new(vec![1.0, 2.0, 3.0]);
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors_is_zero() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        assert!(a.cosine_similarity(&b).abs() < 1e-6);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let dim = EmbeddingDim(768);
        let bad = Embedding::new(vec![0.0; 10]);
        assert!(dim.validate(&bad).is_err());
    }
}
