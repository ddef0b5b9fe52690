//! Context assembly — turn retrieved chunks into prompt text.

use std::sync::Arc;

use rustedtutor_config::RetrievalConfig;
use rustedtutor_core::error::RetrievalError;
use rustedtutor_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever};
use tracing::{debug, info};

/// What the context is for; each purpose has its own chunk budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Answer,
    Quiz,
    Flashcards,
    Socratic,
}

/// Which of the user's materials to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialScope {
    pub user_id: String,
    pub material_id: Option<String>,
    pub use_all_materials: bool,
}

impl MaterialScope {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_material(mut self, material_id: Option<String>) -> Self {
        self.material_id = material_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_all_materials(mut self, use_all_materials: bool) -> Self {
        self.use_all_materials = use_all_materials;
        self
    }
}

/// Retrieved chunks joined for a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedContext {
    chunks: Vec<RetrievedChunk>,
    text: String,
}

impl GroundedContext {
    /// Chunks in descending similarity order.
    pub fn chunks(&self) -> &[RetrievedChunk] {
        &self.chunks
    }

    /// Chunk contents separated by blank lines.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn top_similarity(&self) -> f32 {
        self.chunks.first().map_or(0.0, |c| c.similarity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssembledContext {
    /// Nothing relevant was found.
    Empty,
    Grounded(GroundedContext),
}

pub struct ContextAssembler {
    retriever: Arc<dyn Retriever>,
    budgets: RetrievalConfig,
}

impl ContextAssembler {
    pub fn new(retriever: Arc<dyn Retriever>, budgets: RetrievalConfig) -> Self {
        Self { retriever, budgets }
    }

    pub fn top_k(&self, purpose: Purpose) -> usize {
        match purpose {
            Purpose::Answer => self.budgets.answer_top_k,
            Purpose::Quiz => self.budgets.quiz_top_k,
            Purpose::Flashcards => self.budgets.flashcard_top_k,
            Purpose::Socratic => self.budgets.socratic_top_k,
        }
    }

    pub async fn assemble(
        &self,
        text: &str,
        scope: &MaterialScope,
        purpose: Purpose,
    ) -> Result<AssembledContext, RetrievalError> {
        let query = RetrievalQuery::new(text, scope.user_id.clone(), self.top_k(purpose))
            .with_material(scope.material_id.clone())
            .with_all_materials(scope.use_all_materials);

        let mut chunks = self.retriever.relevant_chunks(&query).await?;
        chunks.retain(|c| !c.content.trim().is_empty());
        chunks.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        chunks.truncate(query.top_k);

        if chunks.is_empty() {
            info!(
                retriever = self.retriever.name(),
                user_id = %scope.user_id,
                ?purpose,
                "No relevant chunks"
            );
            return Ok(AssembledContext::Empty);
        }

        let text = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(
            retriever = self.retriever.name(),
            chunks = chunks.len(),
            top_similarity = chunks[0].similarity,
            ?purpose,
            "Assembled context"
        );

        Ok(AssembledContext::Grounded(GroundedContext { chunks, text }))
    }
}
