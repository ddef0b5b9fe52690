//! Retriever trait — similarity search over a student's uploaded materials.
//!
//! Ingestion, chunking and embedding live outside this runtime. The tutor
//! only needs "give me the most relevant chunks for this query", which is
//! what a [`Retriever`] provides.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A retrieved snippet of study material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The chunk text
    pub content: String,

    /// Relevance in `[0, 1]`, higher is more relevant
    #[serde(default)]
    pub similarity: f32,
}

impl RetrievedChunk {
    pub fn new(content: impl Into<String>, similarity: f32) -> Self {
        Self {
            content: content.into(),
            similarity: similarity.clamp(0.0, 1.0),
        }
    }
}

/// A query against the retrieval backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    /// The search text (question or topic)
    pub text: String,

    /// Whose materials to search
    pub user_id: String,

    /// Restrict the search to one material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,

    /// Search across all of the user's materials
    #[serde(default)]
    pub use_all_materials: bool,

    /// Maximum number of chunks to return
    pub top_k: usize,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>, user_id: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
            material_id: None,
            use_all_materials: false,
            top_k,
        }
    }

    pub fn with_material(mut self, material_id: Option<String>) -> Self {
        self.material_id = material_id;
        self
    }

    pub fn with_all_materials(mut self, use_all_materials: bool) -> Self {
        self.use_all_materials = use_all_materials;
        self
    }
}

/// The retrieval collaborator.
///
/// Implementations must return chunks ordered by descending similarity and
/// may return an empty list.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "http", "in_memory", "none").
    fn name(&self) -> &str;

    /// Fetch up to `query.top_k` chunks relevant to `query.text`.
    async fn relevant_chunks(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError>;
}

/// Sort chunks by descending similarity and keep the best `top_k`.
pub fn rank_chunks(mut chunks: Vec<RetrievedChunk>, top_k: usize) -> Vec<RetrievedChunk> {
    chunks.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    chunks.truncate(top_k);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_similarity_is_clamped() {
        assert_eq!(RetrievedChunk::new("a", 1.7).similarity, 1.0);
        assert_eq!(RetrievedChunk::new("a", -0.2).similarity, 0.0);
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let ranked = rank_chunks(
            vec![
                RetrievedChunk::new("low", 0.1),
                RetrievedChunk::new("high", 0.9),
                RetrievedChunk::new("mid", 0.5),
            ],
            2,
        );
        let contents: Vec<_> = ranked.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["high", "mid"]);
    }

    #[test]
    fn query_builder() {
        let q = RetrievalQuery::new("cells", "u1", 5)
            .with_material(Some("bio-101".into()))
            .with_all_materials(true);
        assert_eq!(q.top_k, 5);
        assert_eq!(q.material_id.as_deref(), Some("bio-101"));
        assert!(q.use_all_materials);

        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["user_id"], "u1");
    }
}
