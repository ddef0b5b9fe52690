//! Conversation memory and retrieval backends for RustedTutor.

pub mod conversation;
pub mod http;
pub mod in_memory;
pub mod noop;

pub use conversation::ConversationMemory;
pub use http::HttpRetriever;
pub use in_memory::InMemoryRetriever;
pub use noop::NoopRetriever;

use rustedtutor_core::retrieval::Retriever;
use std::sync::Arc;

/// Build the retriever selected by `[retrieval] backend`.
pub fn build_retriever(config: &rustedtutor_config::RetrievalConfig) -> Arc<dyn Retriever> {
    match config.backend.as_str() {
        "none" => Arc::new(NoopRetriever),
        _ => Arc::new(HttpRetriever::from_config(config)),
    }
}
