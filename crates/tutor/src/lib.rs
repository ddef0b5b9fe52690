//! Tutoring orchestration for RustedTutor.
//!
//! Routes student questions between general conversation and the student's
//! own materials, generates quizzes and flashcards, scores quizzes and runs
//! the Socratic questioning mode. Every operation returns a payload even
//! when retrieval or the model fails; only bad input is an error.
//!
//! [`Tutor`] wires the pieces together and is what the gateway and CLI use.

pub mod answer;
pub mod context;
pub mod evaluator;
pub mod mode;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod socratic;
pub mod structured;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use answer::{AnswerRequest, AnswerSynthesizer, Grounding};
pub use context::{AssembledContext, ContextAssembler, GroundedContext, MaterialScope, Purpose};
pub use evaluator::{Evaluator, Score};
pub use mode::{ModeSelector, QuestionIntent};
pub use model::ModelClient;
pub use socratic::{SocraticQuestionGenerator, SocraticRequest};
pub use structured::{FlashcardRequest, QuizRequest, StructuredGenerator};

use std::sync::Arc;

use rustedtutor_config::AppConfig;
use rustedtutor_core::error::{Error, ValidationError};
use rustedtutor_core::message::ConversationTurn;
use rustedtutor_core::provider::Provider;
use rustedtutor_core::retrieval::Retriever;
use rustedtutor_core::tutoring::{
    AnswerResult, EvaluationResult, FlashcardResult, QuizResult, SocraticResult,
};
use rustedtutor_memory::ConversationMemory;
use tracing::info;

/// The assembled tutoring service.
///
/// Cheap to share behind an `Arc`; all state lives in the conversation
/// memory, which is safe for concurrent use.
pub struct Tutor {
    memory: Arc<ConversationMemory>,
    answers: AnswerSynthesizer,
    structured: StructuredGenerator,
    evaluator: Evaluator,
    socratic: SocraticQuestionGenerator,
}

impl Tutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        config: &AppConfig,
    ) -> Self {
        let memory = Arc::new(ConversationMemory::new(config.tutor.max_history));
        Self::with_memory(provider, retriever, memory, config)
    }

    /// Build around an existing memory store.
    pub fn with_memory(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        memory: Arc<ConversationMemory>,
        config: &AppConfig,
    ) -> Self {
        let model = ModelClient::from_config(provider, config);
        let context = Arc::new(ContextAssembler::new(retriever, config.retrieval.clone()));
        let settings = config.tutor.clone();

        Self {
            answers: AnswerSynthesizer::new(
                model.clone(),
                memory.clone(),
                context.clone(),
                settings.clone(),
            ),
            structured: StructuredGenerator::new(model.clone(), context.clone(), settings.clone()),
            evaluator: Evaluator::new(model.clone()),
            socratic: SocraticQuestionGenerator::new(model, context, settings),
            memory,
        }
    }

    /// Build the configured provider and retriever.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let provider = rustedtutor_providers::default_provider(config)?;
        let retriever = rustedtutor_memory::build_retriever(&config.retrieval);
        info!(
            provider = provider.name(),
            model = %config.default_model,
            retriever = retriever.name(),
            "Tutor initialized"
        );
        Ok(Self::new(provider, retriever, config))
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResult, ValidationError> {
        self.answers.answer(request).await
    }

    pub async fn history(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.memory.history(user_id).await
    }

    pub async fn clear_conversation(&self, user_id: &str) -> Result<(), ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }
        self.memory.clear(user_id).await;
        Ok(())
    }

    pub async fn quiz(&self, request: &QuizRequest) -> Result<QuizResult, ValidationError> {
        self.structured.quiz(request).await
    }

    pub async fn flashcards(
        &self,
        request: &FlashcardRequest,
    ) -> Result<FlashcardResult, ValidationError> {
        self.structured.flashcards(request).await
    }

    pub async fn evaluate(
        &self,
        user_answers: &[String],
        correct_answers: &[String],
        topic: &str,
    ) -> Result<EvaluationResult, ValidationError> {
        self.evaluator
            .evaluate(user_answers, correct_answers, topic)
            .await
    }

    pub async fn socratic(
        &self,
        request: &SocraticRequest,
    ) -> Result<SocraticResult, ValidationError> {
        self.socratic.generate(request).await
    }
}
