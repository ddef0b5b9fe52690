//! Study commands: `socratic`, `quiz`, `flashcards` and `evaluate`.
//!
//! Results are printed as pretty JSON, the same shape the gateway returns.

use rustedtutor_tutor::{FlashcardRequest, QuizRequest, SocraticRequest};

use super::{build_tutor, print_json};
use crate::Scope;

pub async fn socratic(question: String, scope: Scope) -> anyhow::Result<()> {
    let (_, tutor) = build_tutor()?;
    let result = tutor
        .socratic(&SocraticRequest {
            question,
            user_id: scope.user,
            material_id: scope.material,
            use_all_materials: scope.all_materials,
        })
        .await?;
    print_json(&result)
}

pub async fn quiz(
    topic: String,
    num_questions: usize,
    difficulty: String,
    scope: Scope,
) -> anyhow::Result<()> {
    let (_, tutor) = build_tutor()?;
    let quiz = tutor
        .quiz(&QuizRequest {
            topic,
            user_id: scope.user,
            material_id: scope.material,
            num_questions,
            difficulty,
            use_all_materials: scope.all_materials,
        })
        .await?;
    print_json(&serde_json::json!({ "quiz": quiz }))
}

pub async fn flashcards(topic: String, num_cards: usize, scope: Scope) -> anyhow::Result<()> {
    let (_, tutor) = build_tutor()?;
    let flashcards = tutor
        .flashcards(&FlashcardRequest {
            topic,
            user_id: scope.user,
            material_id: scope.material,
            num_cards,
            use_all_materials: scope.all_materials,
        })
        .await?;
    print_json(&serde_json::json!({ "flashcards": flashcards }))
}

pub async fn evaluate(
    answers: Vec<String>,
    correct_answers: Vec<String>,
    topic: String,
) -> anyhow::Result<()> {
    let (_, tutor) = build_tutor()?;
    let feedback = tutor.evaluate(&answers, &correct_answers, &topic).await?;
    print_json(&serde_json::json!({ "feedback": feedback }))
}
