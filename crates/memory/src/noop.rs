//! No-op retriever — no study materials are ever found.
//!
//! Every answer takes the fallback path and quiz/flashcard generation
//! reports that no materials matched.

use async_trait::async_trait;
use rustedtutor_core::error::RetrievalError;
use rustedtutor_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever};

/// A retriever that always returns an empty result.
pub struct NoopRetriever;

#[async_trait]
impl Retriever for NoopRetriever {
    fn name(&self) -> &str {
        "none"
    }

    async fn relevant_chunks(
        &self,
        _query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        Ok(Vec::new())
    }
}
