//! Quiz and flashcard generation from the student's materials.
//!
//! Both flows retrieve context for the topic, ask the model for a JSON
//! array and parse it tolerantly. Failures never escape: an empty
//! retrieval, a model error or unparseable output all come back as a
//! result with no items and an `error` message.

use std::sync::Arc;

use rustedtutor_config::TutorConfig;
use rustedtutor_core::error::{Error, ValidationError};
use rustedtutor_core::message::Message;
use rustedtutor_core::tutoring::{Difficulty, FlashcardResult, QuizResult};
use tracing::{info, warn};

use crate::context::{AssembledContext, ContextAssembler, MaterialScope, Purpose};
use crate::model::ModelClient;
use crate::parse;
use crate::prompts;

pub const DEFAULT_NUM_QUESTIONS: usize = 5;
pub const DEFAULT_NUM_CARDS: usize = 10;

#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub topic: String,
    pub user_id: String,
    pub material_id: Option<String>,
    pub num_questions: usize,
    /// Echoed back verbatim; unknown labels get medium guidance.
    pub difficulty: String,
    pub use_all_materials: bool,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            user_id: user_id.into(),
            material_id: None,
            num_questions: DEFAULT_NUM_QUESTIONS,
            difficulty: Difficulty::Medium.to_string(),
            use_all_materials: false,
        }
    }

    fn scope(&self) -> MaterialScope {
        MaterialScope::new(&self.user_id)
            .with_material(self.material_id.clone())
            .with_all_materials(self.use_all_materials)
    }
}

#[derive(Debug, Clone)]
pub struct FlashcardRequest {
    pub topic: String,
    pub user_id: String,
    pub material_id: Option<String>,
    pub num_cards: usize,
    pub use_all_materials: bool,
}

impl FlashcardRequest {
    pub fn new(topic: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            user_id: user_id.into(),
            material_id: None,
            num_cards: DEFAULT_NUM_CARDS,
            use_all_materials: false,
        }
    }

    fn scope(&self) -> MaterialScope {
        MaterialScope::new(&self.user_id)
            .with_material(self.material_id.clone())
            .with_all_materials(self.use_all_materials)
    }
}

pub struct StructuredGenerator {
    model: ModelClient,
    context: Arc<ContextAssembler>,
    settings: TutorConfig,
}

impl StructuredGenerator {
    pub fn new(model: ModelClient, context: Arc<ContextAssembler>, settings: TutorConfig) -> Self {
        Self {
            model,
            context,
            settings,
        }
    }

    pub async fn quiz(&self, request: &QuizRequest) -> Result<QuizResult, ValidationError> {
        require("topic", &request.topic)?;
        require("user_id", &request.user_id)?;
        check_count(
            "num_questions",
            request.num_questions,
            self.settings.max_quiz_questions,
        )?;

        let mut result = QuizResult {
            topic: request.topic.clone(),
            difficulty: request.difficulty.clone(),
            questions: Vec::new(),
            error: None,
        };

        let context = match self
            .context
            .assemble(&request.topic, &request.scope(), Purpose::Quiz)
            .await
        {
            Ok(AssembledContext::Grounded(ctx)) => ctx,
            Ok(AssembledContext::Empty) => {
                result.error = Some(prompts::NO_MATERIALS.into());
                return Ok(result);
            }
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Quiz retrieval failed");
                result.error = Some(Error::from(e).to_string());
                return Ok(result);
            }
        };

        let difficulty = Difficulty::parse_lenient(&request.difficulty);
        let messages = vec![
            Message::system(prompts::quiz_instructions(
                request.num_questions,
                &request.difficulty,
                prompts::difficulty_guidance(difficulty),
            )),
            Message::user(prompts::material_request(
                &request.topic,
                context.text(),
                &format!(
                    "Generate {} multiple-choice questions.",
                    request.num_questions
                ),
            )),
        ];

        let raw = match self.model.generate(messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Quiz generation failed");
                result.error = Some(Error::from(e).to_string());
                return Ok(result);
            }
        };

        match parse::parse_quiz_questions(&raw) {
            Ok(mut questions) => {
                questions.truncate(request.num_questions);
                info!(
                    topic = %request.topic,
                    requested = request.num_questions,
                    generated = questions.len(),
                    "Generated quiz"
                );
                result.questions = questions;
            }
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Unparseable quiz output");
                result.error = Some(prompts::QUIZ_PARSE_FAILED.into());
            }
        }
        Ok(result)
    }

    pub async fn flashcards(
        &self,
        request: &FlashcardRequest,
    ) -> Result<FlashcardResult, ValidationError> {
        require("topic", &request.topic)?;
        require("user_id", &request.user_id)?;
        check_count("num_cards", request.num_cards, self.settings.max_flashcards)?;

        let mut result = FlashcardResult {
            topic: request.topic.clone(),
            flashcards: Vec::new(),
            error: None,
        };

        let context = match self
            .context
            .assemble(&request.topic, &request.scope(), Purpose::Flashcards)
            .await
        {
            Ok(AssembledContext::Grounded(ctx)) => ctx,
            Ok(AssembledContext::Empty) => {
                result.error = Some(prompts::NO_MATERIALS.into());
                return Ok(result);
            }
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Flashcard retrieval failed");
                result.error = Some(Error::from(e).to_string());
                return Ok(result);
            }
        };

        let messages = vec![
            Message::system(prompts::flashcard_instructions(request.num_cards)),
            Message::user(prompts::material_request(
                &request.topic,
                context.text(),
                &format!("Generate {} flashcards.", request.num_cards),
            )),
        ];

        let raw = match self.model.generate(messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Flashcard generation failed");
                result.error = Some(Error::from(e).to_string());
                return Ok(result);
            }
        };

        match parse::parse_flashcards(&raw) {
            Ok(mut cards) => {
                cards.truncate(request.num_cards);
                info!(topic = %request.topic, generated = cards.len(), "Generated flashcards");
                result.flashcards = cards;
            }
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "Unparseable flashcard output");
                result.error = Some(prompts::FLASHCARD_PARSE_FAILED.into());
            }
        }
        Ok(result)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn check_count(field: &str, count: usize, max: usize) -> Result<(), ValidationError> {
    if count == 0 || count > max {
        return Err(ValidationError::InvalidArgument(format!(
            "{field} must be between 1 and {max}, got {count}"
        )));
    }
    Ok(())
}
