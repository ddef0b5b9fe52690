//! In-memory retriever — useful for testing and embedded use.
//!
//! Chunks are stored per user and tagged with a material id. Similarity is
//! the fraction of distinct query terms that occur in the chunk, which is
//! crude but deterministic and always within `[0, 1]`.

use async_trait::async_trait;
use rustedtutor_core::error::RetrievalError;
use rustedtutor_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever, rank_chunks};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredChunk {
    material_id: String,
    content: String,
    terms: HashSet<String>,
}

/// A retriever over chunks held in process memory.
pub struct InMemoryRetriever {
    chunks: Arc<RwLock<HashMap<String, Vec<StoredChunk>>>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store one chunk of a user's material.
    pub async fn insert(
        &self,
        user_id: impl Into<String>,
        material_id: impl Into<String>,
        content: impl Into<String>,
    ) {
        let content = content.into();
        let chunk = StoredChunk {
            material_id: material_id.into(),
            terms: terms(&content),
            content,
        };
        self.chunks
            .write()
            .await
            .entry(user_id.into())
            .or_default()
            .push(chunk);
    }

    /// Split `text` on blank lines and store each paragraph as a chunk.
    pub async fn insert_document(&self, user_id: &str, material_id: &str, text: &str) -> usize {
        let mut stored = 0;
        for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            self.insert(user_id, material_id, paragraph).await;
            stored += 1;
        }
        stored
    }

    /// Total chunks stored for a user.
    pub async fn count(&self, user_id: &str) -> usize {
        self.chunks
            .read()
            .await
            .get(user_id)
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased alphanumeric terms of at least three characters.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn relevant_chunks(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let query_terms = terms(&query.text);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.chunks.read().await;
        let Some(user_chunks) = store.get(&query.user_id) else {
            return Ok(Vec::new());
        };

        let material_filter = match (&query.material_id, query.use_all_materials) {
            (Some(id), false) => Some(id.as_str()),
            _ => None,
        };

        let matches = user_chunks
            .iter()
            .filter(|c| material_filter.is_none_or(|id| c.material_id == id))
            .filter_map(|c| {
                let hits = query_terms.intersection(&c.terms).count();
                (hits > 0).then(|| {
                    RetrievedChunk::new(
                        c.content.clone(),
                        hits as f32 / query_terms.len() as f32,
                    )
                })
            })
            .collect();

        Ok(rank_chunks(matches, query.top_k))
    }
}
