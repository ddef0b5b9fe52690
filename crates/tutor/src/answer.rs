//! Answer synthesis — the conversational Q&A flow.
//!
//! # Flow
//!
//! 1. Classify the question (general vs. material-specific)
//! 2. General, or "use all materials": answer from model knowledge with
//!    the last few exchanges as context
//! 3. Otherwise retrieve from the selected material:
//!    - nothing found: answer from general knowledge behind a disclaimer
//!    - chunks found: answer grounded in them, choosing a stricter or
//!      looser persona by the top chunk's similarity
//! 4. Record the exchange and return the answer with its sources
//!
//! Any retrieval or model failure becomes an inline apology with
//! `mode: error`; only missing input is returned as an error.

use std::sync::Arc;

use rustedtutor_config::TutorConfig;
use rustedtutor_core::error::{Error, ValidationError};
use rustedtutor_core::message::Message;
use rustedtutor_core::retrieval::RetrievedChunk;
use rustedtutor_core::tutoring::{AnswerMode, AnswerResult, SourceRef};
use rustedtutor_memory::ConversationMemory;
use tracing::{info, warn};

use crate::context::{AssembledContext, ContextAssembler, MaterialScope, Purpose};
use crate::mode::ModeSelector;
use crate::model::ModelClient;
use crate::prompts;

/// A student's question and where to look for the answer.
#[derive(Debug, Clone, Default)]
pub struct AnswerRequest {
    pub question: String,
    pub user_id: String,
    pub material_id: Option<String>,
    pub use_all_materials: bool,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    pub fn with_all_materials(mut self, use_all_materials: bool) -> Self {
        self.use_all_materials = use_all_materials;
        self
    }
}

/// System prompt variant for grounded answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grounding {
    /// Weak match: use the context but fill gaps from general knowledge.
    Blend,
    /// Strong match: stay with the materials.
    Strict,
}

impl Grounding {
    pub fn for_similarity(top_similarity: f32, threshold: f32) -> Self {
        if top_similarity < threshold {
            Self::Blend
        } else {
            Self::Strict
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Blend => prompts::BLEND_PERSONA,
            Self::Strict => prompts::GROUNDED_PERSONA,
        }
    }
}

pub struct AnswerSynthesizer {
    model: ModelClient,
    memory: Arc<ConversationMemory>,
    context: Arc<ContextAssembler>,
    settings: TutorConfig,
}

impl AnswerSynthesizer {
    pub fn new(
        model: ModelClient,
        memory: Arc<ConversationMemory>,
        context: Arc<ContextAssembler>,
        settings: TutorConfig,
    ) -> Self {
        Self {
            model,
            memory,
            context,
            settings,
        }
    }

    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResult, ValidationError> {
        if request.question.trim().is_empty() {
            return Err(ValidationError::MissingField("question"));
        }
        if request.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }

        match self.route(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "Answer failed, degrading");
                Ok(AnswerResult {
                    answer: prompts::answer_error(&e.to_string()),
                    sources: Vec::new(),
                    mode: AnswerMode::Error,
                })
            }
        }
    }

    async fn route(&self, request: &AnswerRequest) -> Result<AnswerResult, Error> {
        let intent = ModeSelector::classify(&request.question);
        info!(
            user_id = %request.user_id,
            general = intent.general,
            context_required = intent.context_required,
            use_all_materials = request.use_all_materials,
            "Routing question"
        );

        if intent.skips_retrieval(self.settings.explicit_reference_forces_retrieval)
            || request.use_all_materials
        {
            let mode = if intent.general {
                AnswerMode::General
            } else {
                AnswerMode::KnowledgeBase
            };
            return self.knowledge_only(request, mode).await;
        }

        let scope = MaterialScope::new(&request.user_id).with_material(request.material_id.clone());
        match self
            .context
            .assemble(&request.question, &scope, Purpose::Answer)
            .await?
        {
            AssembledContext::Empty => self.fallback(request).await,
            AssembledContext::Grounded(ctx) => {
                let grounding =
                    Grounding::for_similarity(ctx.top_similarity(), self.settings.blend_threshold);
                info!(
                    top_similarity = ctx.top_similarity(),
                    ?grounding,
                    chunks = ctx.chunks().len(),
                    "Answering from materials"
                );

                let mut messages = vec![Message::system(grounding.system_prompt())];
                messages.extend(self.history(request, self.settings.grounded_history_turns).await);
                messages.push(Message::user(prompts::grounded_question(
                    ctx.text(),
                    &request.question,
                )));

                let answer = self.model.generate(messages).await?;
                self.memory
                    .record_exchange(&request.user_id, &request.question, &answer)
                    .await?;

                Ok(AnswerResult {
                    answer,
                    sources: self.sources(ctx.chunks()),
                    mode: AnswerMode::DocumentBased,
                })
            }
        }
    }

    async fn knowledge_only(
        &self,
        request: &AnswerRequest,
        mode: AnswerMode,
    ) -> Result<AnswerResult, Error> {
        let mut messages = vec![Message::system(prompts::GENERAL_PERSONA)];
        messages.extend(self.history(request, self.settings.general_history_turns).await);
        messages.push(Message::user(&request.question));

        let answer = self.model.generate(messages).await?;
        self.memory
            .record_exchange(&request.user_id, &request.question, &answer)
            .await?;

        Ok(AnswerResult {
            answer,
            sources: Vec::new(),
            mode,
        })
    }

    async fn fallback(&self, request: &AnswerRequest) -> Result<AnswerResult, Error> {
        info!(user_id = %request.user_id, "No material matched, answering from general knowledge");

        let mut messages = vec![Message::system(prompts::FALLBACK_PERSONA)];
        messages.extend(self.history(request, self.settings.grounded_history_turns).await);
        messages.push(Message::user(&request.question));

        let answer = self.model.generate(messages).await?;
        self.memory
            .record_exchange(&request.user_id, &request.question, &answer)
            .await?;

        Ok(AnswerResult {
            answer: format!("{}{answer}", prompts::FALLBACK_DISCLAIMER),
            sources: Vec::new(),
            mode: AnswerMode::Fallback,
        })
    }

    async fn history(&self, request: &AnswerRequest, turns: usize) -> Vec<Message> {
        self.memory
            .recent(&request.user_id, turns)
            .await
            .iter()
            .map(Message::from)
            .collect()
    }

    fn sources(&self, chunks: &[RetrievedChunk]) -> Vec<SourceRef> {
        chunks
            .iter()
            .take(self.settings.max_sources)
            .map(|c| SourceRef {
                content: preview(&c.content, self.settings.source_preview_chars),
                similarity: c.similarity,
            })
            .collect()
    }
}

/// First `limit` characters, with an ellipsis if anything was cut.
fn preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingRetriever, ScriptedProvider, StaticRetriever, chunk};
    use rustedtutor_config::RetrievalConfig;
    use rustedtutor_core::error::ProviderError;
    use rustedtutor_core::message::{Role, TurnRole};
    use rustedtutor_core::retrieval::Retriever;

    struct Fixture {
        provider: Arc<ScriptedProvider>,
        memory: Arc<ConversationMemory>,
        synth: AnswerSynthesizer,
    }

    fn fixture(provider: ScriptedProvider, retriever: Arc<dyn Retriever>) -> Fixture {
        fixture_with(provider, retriever, TutorConfig::default())
    }

    fn fixture_with(
        provider: ScriptedProvider,
        retriever: Arc<dyn Retriever>,
        settings: TutorConfig,
    ) -> Fixture {
        let provider = Arc::new(provider);
        let memory = Arc::new(ConversationMemory::new(settings.max_history));
        let context = Arc::new(ContextAssembler::new(retriever, RetrievalConfig::default()));
        let synth = AnswerSynthesizer::new(
            ModelClient::new(provider.clone(), "mock-model"),
            memory.clone(),
            context,
            settings,
        );
        Fixture {
            provider,
            memory,
            synth,
        }
    }

    #[tokio::test]
    async fn greeting_takes_general_path_and_is_remembered() {
        let f = fixture(
            ScriptedProvider::text("Hi Sam!"),
            Arc::new(StaticRetriever::new(vec![chunk("unused", 0.9)])),
        );
        let result = f
            .synth
            .answer(&AnswerRequest::new("Hello, my name is Sam", "u1"))
            .await
            .unwrap();

        assert_eq!(result.mode, AnswerMode::General);
        assert_eq!(result.answer, "Hi Sam!");
        assert!(result.sources.is_empty());

        let request = f.provider.last_request();
        assert_eq!(request.system_prompt(), Some(prompts::GENERAL_PERSONA));

        let history = f.memory.history("u1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content(), "Hello, my name is Sam");
        assert_eq!(history[1].role(), TurnRole::Assistant);
    }

    #[tokio::test]
    async fn all_materials_uses_knowledge_base_mode() {
        let retriever = Arc::new(StaticRetriever::new(vec![chunk("ctx", 0.9)]));
        let f = fixture(ScriptedProvider::text("Osmosis is..."), retriever.clone());
        let request = AnswerRequest::new("Explain osmosis", "u1").with_all_materials(true);
        let result = f.synth.answer(&request).await.unwrap();

        assert_eq!(result.mode, AnswerMode::KnowledgeBase);
        assert!(retriever.last_query().is_none());
    }

    #[tokio::test]
    async fn general_path_replays_six_turns() {
        let f = fixture(ScriptedProvider::text("ok"), Arc::new(StaticRetriever::empty()));
        for i in 0..5 {
            f.memory
                .record_exchange("u1", format!("q{i}"), format!("a{i}"))
                .await
                .unwrap();
        }
        f.synth.answer(&AnswerRequest::new("thanks", "u1")).await.unwrap();

        let messages = f.provider.last_request().messages;
        // system + 6 history turns + question
        assert_eq!(messages.len(), 8);
        assert_eq!(messages[1].content, "q2");
        assert_eq!(messages[7].content, "thanks");
        assert_eq!(messages[7].role, Role::User);
    }

    #[tokio::test]
    async fn empty_retrieval_falls_back_with_disclaimer() {
        let f = fixture(
            ScriptedProvider::text("Enzymes are catalysts."),
            Arc::new(StaticRetriever::empty()),
        );
        let result = f
            .synth
            .answer(&AnswerRequest::new("Explain enzymes", "u1"))
            .await
            .unwrap();

        assert_eq!(result.mode, AnswerMode::Fallback);
        assert!(result.answer.starts_with(prompts::FALLBACK_DISCLAIMER));
        assert!(result.answer.ends_with("Enzymes are catalysts."));
        assert_eq!(f.provider.last_request().system_prompt(), Some(prompts::FALLBACK_PERSONA));

        let history = f.memory.history("u1").await;
        assert_eq!(history[1].content(), "Enzymes are catalysts.");
    }

    #[tokio::test]
    async fn low_similarity_selects_blend_prompt() {
        let f = fixture(
            ScriptedProvider::text("Answer"),
            Arc::new(StaticRetriever::new(vec![chunk("loosely related", 0.25)])),
        );
        let result = f
            .synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();

        assert_eq!(result.mode, AnswerMode::DocumentBased);
        let request = f.provider.last_request();
        assert_eq!(request.system_prompt(), Some(prompts::BLEND_PERSONA));
        let last = request.messages.last().unwrap();
        assert!(last.content.starts_with("Context from study materials:\nloosely related"));
        assert!(last.content.ends_with("Question: Explain mitosis"));
    }

    #[tokio::test]
    async fn high_similarity_selects_grounded_prompt() {
        let f = fixture(
            ScriptedProvider::text("Answer"),
            Arc::new(StaticRetriever::new(vec![chunk("closely related", 0.9)])),
        );
        f.synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();
        assert_eq!(
            f.provider.last_request().system_prompt(),
            Some(prompts::GROUNDED_PERSONA)
        );
    }

    #[test]
    fn threshold_boundary_is_strict() {
        assert_eq!(Grounding::for_similarity(0.3, 0.3), Grounding::Strict);
        assert_eq!(Grounding::for_similarity(0.29, 0.3), Grounding::Blend);
    }

    #[tokio::test]
    async fn sources_are_top_three_and_truncated() {
        let long = "x".repeat(250);
        let f = fixture(
            ScriptedProvider::text("Answer"),
            Arc::new(StaticRetriever::new(vec![
                chunk(&long, 0.9),
                chunk("b", 0.8),
                chunk("c", 0.7),
                chunk("d", 0.6),
            ])),
        );
        let result = f
            .synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();

        assert_eq!(result.sources.len(), 3);
        assert_eq!(result.sources[0].content, format!("{}...", "x".repeat(200)));
        assert_eq!(result.sources[1].content, "b");
        assert_eq!(result.sources[0].similarity, 0.9);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("short", 200), "short");
    }

    #[tokio::test]
    async fn model_failure_degrades_to_error_mode() {
        let f = fixture(
            ScriptedProvider::failing(ProviderError::Timeout("60s".into())),
            Arc::new(StaticRetriever::new(vec![chunk("ctx", 0.9)])),
        );
        let result = f
            .synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();

        assert_eq!(result.mode, AnswerMode::Error);
        assert!(result.answer.starts_with("I encountered an error: "));
        assert!(result.answer.ends_with(". Please try again."));
        assert!(f.memory.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_to_error_mode() {
        let f = fixture(ScriptedProvider::new(vec![]), Arc::new(FailingRetriever));
        let result = f
            .synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();

        assert_eq!(result.mode, AnswerMode::Error);
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let f = fixture(ScriptedProvider::new(vec![]), Arc::new(StaticRetriever::empty()));
        assert_eq!(
            f.synth.answer(&AnswerRequest::new("  ", "u1")).await.unwrap_err(),
            ValidationError::MissingField("question")
        );
        assert_eq!(
            f.synth.answer(&AnswerRequest::new("hi", "")).await.unwrap_err(),
            ValidationError::MissingField("user_id")
        );
    }

    #[tokio::test]
    async fn explicit_reference_can_force_retrieval() {
        let settings = TutorConfig {
            explicit_reference_forces_retrieval: true,
            ..TutorConfig::default()
        };
        let retriever = Arc::new(StaticRetriever::new(vec![chunk("syllabus week 3", 0.8)]));
        let f = fixture_with(ScriptedProvider::text("Week 3"), retriever.clone(), settings);

        let result = f
            .synth
            .answer(&AnswerRequest::new("Hey, what is in my syllabus?", "u1"))
            .await
            .unwrap();
        assert_eq!(result.mode, AnswerMode::DocumentBased);
        assert!(retriever.last_query().is_some());
    }

    #[tokio::test]
    async fn grounded_path_replays_recorded_turns() {
        let f = fixture(
            ScriptedProvider::text("ok"),
            Arc::new(StaticRetriever::new(vec![chunk("ctx", 0.9)])),
        );
        f.memory.record_exchange("u1", "q0", "a0").await.unwrap();
        f.synth
            .answer(&AnswerRequest::new("Explain mitosis", "u1"))
            .await
            .unwrap();

        let sent = f.provider.last_request().messages;
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].content, "q0");
        assert_eq!(sent[1].role, Role::User);
        assert_eq!(sent[2].content, "a0");
        assert_eq!(sent[2].role, Role::Assistant);
    }
}
