//! HTTP retriever — client for the external document retrieval service.
//!
//! The service owns ingestion, chunking, embeddings and similarity search.
//! We POST the query to `{url}/relevant-chunks` and accept either
//! `{"chunks": [...]}` or a bare JSON array of `{content, similarity}`.

use async_trait::async_trait;
use rustedtutor_core::error::RetrievalError;
use rustedtutor_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever, rank_chunks};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A retriever backed by a remote similarity-search service.
pub struct HttpRetriever {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRetriever {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build from the `[retrieval]` config section.
    pub fn from_config(config: &rustedtutor_config::RetrievalConfig) -> Self {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    fn endpoint(&self) -> String {
        format!("{}/relevant-chunks", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChunksResponse {
    Wrapped { chunks: Vec<RetrievedChunk> },
    Bare(Vec<RetrievedChunk>),
}

impl ChunksResponse {
    fn into_chunks(self) -> Vec<RetrievedChunk> {
        let chunks = match self {
            Self::Wrapped { chunks } => chunks,
            Self::Bare(chunks) => chunks,
        };
        chunks
            .into_iter()
            .map(|c| RetrievedChunk::new(c.content, c.similarity))
            .collect()
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    fn name(&self) -> &str {
        "http"
    }

    async fn relevant_chunks(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(query)
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Retrieval service returned error");
            return Err(RetrievalError::Unavailable(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ChunksResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse(e.to_string()))?;

        let chunks = rank_chunks(parsed.into_chunks(), query.top_k);
        debug!(
            user_id = %query.user_id,
            top_k = query.top_k,
            returned = chunks.len(),
            "Retrieved chunks"
        );
        Ok(chunks)
    }
}
