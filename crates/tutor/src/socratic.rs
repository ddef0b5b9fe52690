//! Socratic mode — guide the student with questions instead of answers.

use std::sync::Arc;

use rustedtutor_config::TutorConfig;
use rustedtutor_core::error::{Error, ValidationError};
use rustedtutor_core::message::Message;
use rustedtutor_core::tutoring::SocraticResult;
use tracing::{info, warn};

use crate::context::{AssembledContext, ContextAssembler, MaterialScope, Purpose};
use crate::model::ModelClient;
use crate::parse;
use crate::prompts;

#[derive(Debug, Clone, Default)]
pub struct SocraticRequest {
    pub question: String,
    pub user_id: String,
    pub material_id: Option<String>,
    pub use_all_materials: bool,
}

impl SocraticRequest {
    pub fn new(question: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

pub struct SocraticQuestionGenerator {
    model: ModelClient,
    context: Arc<ContextAssembler>,
    settings: TutorConfig,
}

impl SocraticQuestionGenerator {
    pub fn new(model: ModelClient, context: Arc<ContextAssembler>, settings: TutorConfig) -> Self {
        Self {
            model,
            context,
            settings,
        }
    }

    pub async fn generate(
        &self,
        request: &SocraticRequest,
    ) -> Result<SocraticResult, ValidationError> {
        if request.question.trim().is_empty() {
            return Err(ValidationError::MissingField("question"));
        }
        if request.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }

        match self.guide(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "Socratic generation failed");
                Ok(SocraticResult {
                    questions: vec![prompts::SOCRATIC_ERROR_QUESTION.to_string()],
                    hint: format!("Error: {e}"),
                })
            }
        }
    }

    async fn guide(&self, request: &SocraticRequest) -> Result<SocraticResult, Error> {
        let scope = MaterialScope::new(&request.user_id)
            .with_material(request.material_id.clone())
            .with_all_materials(request.use_all_materials);

        let context = match self
            .context
            .assemble(&request.question, &scope, Purpose::Socratic)
            .await?
        {
            AssembledContext::Grounded(ctx) => ctx,
            AssembledContext::Empty => {
                info!(user_id = %request.user_id, "No materials, returning bootstrap questions");
                return Ok(SocraticResult {
                    questions: prompts::SOCRATIC_BOOTSTRAP.map(String::from).to_vec(),
                    hint: prompts::UPLOAD_HINT.to_string(),
                });
            }
        };

        let messages = vec![
            Message::system(prompts::SOCRATIC_PERSONA),
            Message::user(prompts::socratic_request(context.text(), &request.question)),
        ];
        let raw = self
            .model
            .generate_at(messages, self.settings.socratic_temperature)
            .await?;

        let mut questions = parse::parse_guiding_questions(&raw);
        if questions.is_empty() {
            questions.push(raw);
        }

        Ok(SocraticResult {
            questions,
            hint: prompts::SOCRATIC_HINT.to_string(),
        })
    }
}
