//! Shared test doubles for the orchestration tests.

use rustedtutor_core::error::{ProviderError, RetrievalError};
use rustedtutor_core::message::Message;
use rustedtutor_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use rustedtutor_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that replays scripted outcomes and records every request.
///
/// Once the script is exhausted it repeats `fallback`, or panics if none
/// was given.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Answer every call with the same text.
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ProviderRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was made")
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        let text = match (next, &self.fallback) {
            (Some(outcome), _) => outcome?,
            (None, Some(text)) => text.clone(),
            (None, None) => panic!("ScriptedProvider: script exhausted"),
        };
        Ok(make_text_response(&text))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A retriever that always returns the same chunks and remembers the query.
pub struct StaticRetriever {
    chunks: Vec<RetrievedChunk>,
    last_query: Mutex<Option<RetrievalQuery>>,
}

impl StaticRetriever {
    pub fn new(chunks: Vec<RetrievedChunk>) -> Self {
        Self {
            chunks,
            last_query: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn last_query(&self) -> Option<RetrievalQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn relevant_chunks(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        Ok(self.chunks.iter().take(query.top_k).cloned().collect())
    }
}

/// A retriever whose backing service is down.
pub struct FailingRetriever;

#[async_trait::async_trait]
impl Retriever for FailingRetriever {
    fn name(&self) -> &str {
        "failing"
    }

    async fn relevant_chunks(
        &self,
        _query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        Err(RetrievalError::Unavailable("connection refused".into()))
    }
}

pub fn chunk(content: &str, similarity: f32) -> RetrievedChunk {
    RetrievedChunk::new(content, similarity)
}
