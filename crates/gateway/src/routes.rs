//! Tutoring endpoints.
//!
//! Request bodies use snake_case field names. Required fields are optional
//! in the DTOs so a missing field is reported as a 400 with an `error`
//! message instead of an extractor rejection.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use rustedtutor_core::error::ValidationError;
use rustedtutor_core::tutoring::{
    AnswerResult, EvaluationResult, FlashcardResult, QuizResult, SocraticResult,
};
use rustedtutor_tutor::structured::{DEFAULT_NUM_CARDS, DEFAULT_NUM_QUESTIONS};
use rustedtutor_tutor::{AnswerRequest, FlashcardRequest, QuizRequest, SocraticRequest};

use crate::SharedState;

// ── DTOs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskQuestionBody {
    question: Option<String>,
    user_id: Option<String>,
    material_id: Option<String>,
    #[serde(default)]
    use_all_materials: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClearConversationBody {
    user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearConversationResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuizBody {
    topic: Option<String>,
    user_id: Option<String>,
    material_id: Option<String>,
    num_questions: Option<usize>,
    difficulty: Option<String>,
    #[serde(default)]
    use_all_materials: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub quiz: QuizResult,
}

#[derive(Debug, Deserialize)]
pub struct GenerateFlashcardsBody {
    topic: Option<String>,
    user_id: Option<String>,
    material_id: Option<String>,
    num_cards: Option<usize>,
    #[serde(default)]
    use_all_materials: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardsResponse {
    pub flashcards: FlashcardResult,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAnswersBody {
    answers: Option<Vec<String>>,
    correct_answers: Option<Vec<String>>,
    #[serde(default)]
    topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub feedback: EvaluationResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn rejected(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
}

impl From<ValidationError> for ErrorResponse {
    fn from(e: ValidationError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

fn invalid(e: ValidationError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(e.into()))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| invalid(ValidationError::MissingField(field)))
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub async fn ask_question(
    State(state): State<SharedState>,
    payload: Result<Json<AskQuestionBody>, JsonRejection>,
) -> ApiResult<AnswerResult> {
    let Json(body) = payload.map_err(rejected)?;
    let request = AnswerRequest {
        question: required(body.question, "question")?,
        user_id: required(body.user_id, "user_id")?,
        material_id: body.material_id,
        use_all_materials: body.use_all_materials,
    };

    let result = state.tutor.answer(&request).await.map_err(invalid)?;
    info!(user_id = %request.user_id, mode = %result.mode, "Answered question");
    Ok(Json(result))
}

pub async fn clear_conversation(
    State(state): State<SharedState>,
    payload: Result<Json<ClearConversationBody>, JsonRejection>,
) -> ApiResult<ClearConversationResponse> {
    let Json(body) = payload.map_err(rejected)?;
    let user_id = required(body.user_id, "user_id")?;

    state
        .tutor
        .clear_conversation(&user_id)
        .await
        .map_err(invalid)?;
    Ok(Json(ClearConversationResponse {
        message: "Conversation history cleared successfully".into(),
    }))
}

pub async fn socratic_question(
    State(state): State<SharedState>,
    payload: Result<Json<AskQuestionBody>, JsonRejection>,
) -> ApiResult<SocraticResult> {
    let Json(body) = payload.map_err(rejected)?;
    let request = SocraticRequest {
        question: required(body.question, "question")?,
        user_id: required(body.user_id, "user_id")?,
        material_id: body.material_id,
        use_all_materials: body.use_all_materials,
    };

    let result = state.tutor.socratic(&request).await.map_err(invalid)?;
    Ok(Json(result))
}

pub async fn generate_quiz(
    State(state): State<SharedState>,
    payload: Result<Json<GenerateQuizBody>, JsonRejection>,
) -> ApiResult<QuizResponse> {
    let Json(body) = payload.map_err(rejected)?;
    let request = QuizRequest {
        topic: required(body.topic, "topic")?,
        user_id: required(body.user_id, "user_id")?,
        material_id: body.material_id,
        num_questions: body.num_questions.unwrap_or(DEFAULT_NUM_QUESTIONS),
        difficulty: body.difficulty.unwrap_or_else(|| "medium".into()),
        use_all_materials: body.use_all_materials,
    };

    let quiz = state.tutor.quiz(&request).await.map_err(invalid)?;
    Ok(Json(QuizResponse { quiz }))
}

pub async fn generate_flashcards(
    State(state): State<SharedState>,
    payload: Result<Json<GenerateFlashcardsBody>, JsonRejection>,
) -> ApiResult<FlashcardsResponse> {
    let Json(body) = payload.map_err(rejected)?;
    let request = FlashcardRequest {
        topic: required(body.topic, "topic")?,
        user_id: required(body.user_id, "user_id")?,
        material_id: body.material_id,
        num_cards: body.num_cards.unwrap_or(DEFAULT_NUM_CARDS),
        use_all_materials: body.use_all_materials,
    };

    let flashcards = state.tutor.flashcards(&request).await.map_err(invalid)?;
    Ok(Json(FlashcardsResponse { flashcards }))
}

pub async fn evaluate_answers(
    State(state): State<SharedState>,
    payload: Result<Json<EvaluateAnswersBody>, JsonRejection>,
) -> ApiResult<EvaluationResponse> {
    let Json(body) = payload.map_err(rejected)?;
    let answers = body
        .answers
        .ok_or_else(|| invalid(ValidationError::MissingField("answers")))?;
    let correct_answers = body
        .correct_answers
        .ok_or_else(|| invalid(ValidationError::MissingField("correct_answers")))?;
    if body.topic.trim().is_empty() {
        return Err(invalid(ValidationError::MissingField("topic")));
    }

    let feedback = state
        .tutor
        .evaluate(&answers, &correct_answers, &body.topic)
        .await
        .map_err(invalid)?;
    Ok(Json(EvaluationResponse { feedback }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use rustedtutor_config::AppConfig;
    use rustedtutor_core::error::ProviderError;
    use rustedtutor_core::message::Message;
    use rustedtutor_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
    use rustedtutor_core::tutoring::AnswerMode;
    use rustedtutor_memory::InMemoryRetriever;
    use rustedtutor_tutor::Tutor;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        response_text: String,
    }

    impl MockProvider {
        fn new(text: &str) -> Self {
            Self {
                response_text: text.to_string(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(&self.response_text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    async fn app_with(response: &str) -> (Arc<Tutor>, axum::Router) {
        let retriever = InMemoryRetriever::new();
        retriever
            .insert_document(
                "u1",
                "bio",
                "Mitochondria produce ATP through cellular respiration.\n\n\
                 Photosynthesis happens in chloroplasts.",
            )
            .await;
        let tutor = Arc::new(Tutor::new(
            Arc::new(MockProvider::new(response)),
            Arc::new(retriever),
            &AppConfig::default(),
        ));
        (tutor.clone(), build_router(GatewayState::new(tutor)))
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn ask_question_grounded() {
        let (tutor, app) = app_with("ATP comes from mitochondria.").await;
        let response = app
            .oneshot(post(
                "/ask-question",
                serde_json::json!({"question": "Where is ATP produced by mitochondria?", "user_id": "u1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result: AnswerResult = json_body(response).await;
        assert_eq!(result.mode, AnswerMode::DocumentBased);
        assert_eq!(result.answer, "ATP comes from mitochondria.");
        assert!(!result.sources.is_empty());
        assert_eq!(tutor.history("u1").await.len(), 2);
    }

    #[tokio::test]
    async fn ask_question_missing_field_is_400() {
        let (_, app) = app_with("unused").await;
        let response = app
            .oneshot(post("/ask-question", serde_json::json!({"question": "Why?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json_body(response).await;
        assert!(error.error.contains("user_id"));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_with_error_body() {
        let (_, app) = app_with("unused").await;
        let req = Request::builder()
            .method("POST")
            .uri("/ask-question")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json_body(response).await;
        assert!(!error.error.is_empty());
    }

    #[tokio::test]
    async fn clear_conversation_confirms() {
        let (tutor, app) = app_with("Hi!").await;
        tutor
            .answer(&AnswerRequest::new("hello", "u1"))
            .await
            .unwrap();

        let response = app
            .oneshot(post("/clear-conversation", serde_json::json!({"user_id": "u1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: ClearConversationResponse = json_body(response).await;
        assert!(body.message.contains("cleared"));
        assert!(tutor.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn generate_quiz_wraps_result() {
        let quiz = r#"```json
[{"question": "What produces ATP?", "options": {"A": "Mitochondria", "B": "Nucleus", "C": "Golgi", "D": "Lysosome"}, "correct_answer": "A", "explanation": "Respiration."}]
```"#;
        let (_, app) = app_with(quiz).await;
        let response = app
            .oneshot(post(
                "/generate-quiz",
                serde_json::json!({"topic": "mitochondria", "user_id": "u1", "num_questions": 1}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: QuizResponse = json_body(response).await;
        assert_eq!(body.quiz.difficulty, "medium");
        assert_eq!(body.quiz.questions.len(), 1);
        assert_eq!(body.quiz.error, None);
    }

    #[tokio::test]
    async fn generate_flashcards_without_materials_reports_error() {
        let (_, app) = app_with("unused").await;
        let response = app
            .oneshot(post(
                "/generate-flashcards",
                serde_json::json!({"topic": "quantum chromodynamics", "user_id": "u1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: FlashcardsResponse = json_body(response).await;
        assert!(body.flashcards.flashcards.is_empty());
        assert_eq!(
            body.flashcards.error.as_deref(),
            Some("No relevant materials found for this topic")
        );
    }

    #[tokio::test]
    async fn socratic_question_returns_questions_and_hint() {
        let (_, app) = app_with("1. What is ATP?\n2. Where might it be made?").await;
        let response = app
            .oneshot(post(
                "/socratic-question",
                serde_json::json!({"question": "How do mitochondria make ATP?", "user_id": "u1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: SocraticResult = json_body(response).await;
        assert_eq!(body.questions, vec!["What is ATP?", "Where might it be made?"]);
        assert!(!body.hint.is_empty());
    }

    #[tokio::test]
    async fn evaluate_answers_scores() {
        let (_, app) = app_with("Nice work.").await;
        let response = app
            .oneshot(post(
                "/evaluate-answers",
                serde_json::json!({"answers": ["A", "B"], "correct_answers": ["A", "C"], "topic": "Cells"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: EvaluationResponse = json_body(response).await;
        assert_eq!(body.feedback.correct, 1);
        assert_eq!(body.feedback.total, 2);
        assert_eq!(body.feedback.score, 50.0);
        assert_eq!(body.feedback.feedback, "Nice work.");
    }

    #[tokio::test]
    async fn evaluate_empty_key_is_400() {
        let (_, app) = app_with("unused").await;
        let response = app
            .oneshot(post(
                "/evaluate-answers",
                serde_json::json!({"answers": [], "correct_answers": [], "topic": "Cells"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluate_length_mismatch_is_400() {
        let (_, app) = app_with("unused").await;
        let response = app
            .oneshot(post(
                "/evaluate-answers",
                serde_json::json!({"answers": ["A", "B", "C"], "correct_answers": ["A"], "topic": "Cells"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
