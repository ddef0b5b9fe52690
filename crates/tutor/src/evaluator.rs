//! Quiz scoring and feedback.

use rustedtutor_core::error::ValidationError;
use rustedtutor_core::message::Message;
use rustedtutor_core::tutoring::{Difficulty, EvaluationResult};
use tracing::{info, warn};

use crate::model::ModelClient;
use crate::prompts;

/// Raw tally of a submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// Percentage in `[0, 100]`.
    pub percent: f64,
}

impl Score {
    /// Compare answers index by index with exact label equality.
    ///
    /// Both sequences must be non-empty and of equal length.
    pub fn tally(user_answers: &[String], correct_answers: &[String]) -> Result<Self, ValidationError> {
        let total = correct_answers.len();
        if total == 0 {
            return Err(ValidationError::InvalidArgument(
                "correct_answers must not be empty".into(),
            ));
        }
        if user_answers.len() != total {
            return Err(ValidationError::InvalidArgument(format!(
                "expected {total} answers, got {}",
                user_answers.len()
            )));
        }

        let correct = user_answers
            .iter()
            .zip(correct_answers)
            .filter(|(given, expected)| given == expected)
            .count();

        Ok(Self {
            correct,
            total,
            percent: correct as f64 / total as f64 * 100.0,
        })
    }

    pub fn suggested_difficulty(&self) -> Difficulty {
        Difficulty::suggested_for_score(self.percent)
    }
}

pub struct Evaluator {
    model: ModelClient,
}

impl Evaluator {
    pub fn new(model: ModelClient) -> Self {
        Self { model }
    }

    pub async fn evaluate(
        &self,
        user_answers: &[String],
        correct_answers: &[String],
        topic: &str,
    ) -> Result<EvaluationResult, ValidationError> {
        let score = Score::tally(user_answers, correct_answers)?;

        let suggested = score.suggested_difficulty();
        info!(
            topic,
            correct = score.correct,
            total = score.total,
            score = score.percent,
            %suggested,
            "Evaluated quiz"
        );

        let messages = vec![
            Message::system(prompts::EVALUATION_PERSONA),
            Message::user(prompts::evaluation_request(
                topic,
                score.correct,
                score.total,
                score.percent,
            )),
        ];

        let (feedback, error) = match self.model.generate(messages).await {
            Ok(feedback) => (feedback, None),
            Err(e) => {
                warn!(topic, error = %e, "Feedback generation failed");
                (
                    prompts::fallback_feedback(topic, score.correct, score.total, suggested),
                    Some(e.to_string()),
                )
            }
        };

        Ok(EvaluationResult {
            score: score.percent,
            correct: score.correct,
            total: score.total,
            feedback,
            suggested_difficulty: suggested,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use rustedtutor_core::error::ProviderError;
    use std::sync::Arc;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn evaluator(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, Evaluator) {
        let provider = Arc::new(provider);
        let evaluator = Evaluator::new(ModelClient::new(provider.clone(), "mock-model"));
        (provider, evaluator)
    }

    #[tokio::test]
    async fn half_right_is_medium() {
        let (provider, evaluator) = evaluator(ScriptedProvider::text("Good effort!"));
        let result = evaluator
            .evaluate(&labels(&["A", "B"]), &labels(&["A", "C"]), "Cells")
            .await
            .unwrap();

        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.score, 50.0);
        assert_eq!(result.suggested_difficulty, Difficulty::Medium);
        assert_eq!(result.feedback, "Good effort!");
        assert_eq!(result.error, None);
        assert!(provider.last_request().messages[1]
            .content
            .contains("Score: 1/2 (50.0%)"));
    }

    #[test]
    fn thresholds_map_to_difficulty() {
        let key = labels(&["A", "A", "A", "A", "A"]);
        let perfect = Score::tally(&key, &key).unwrap();
        assert_eq!(perfect.suggested_difficulty(), Difficulty::Hard);

        let four = Score::tally(&labels(&["A", "A", "A", "A", "B"]), &key).unwrap();
        assert_eq!(four.percent, 80.0);
        assert_eq!(four.suggested_difficulty(), Difficulty::Hard);

        let two = Score::tally(&labels(&["A", "A", "B", "B", "B"]), &key).unwrap();
        assert_eq!(two.suggested_difficulty(), Difficulty::Easy);
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(matches!(
            Score::tally(&[], &[]).unwrap_err(),
            ValidationError::InvalidArgument(_)
        ));
    }

    #[test]
    fn labels_compare_exactly() {
        let score = Score::tally(&labels(&["a", "B "]), &labels(&["A", "B"])).unwrap();
        assert_eq!(score.correct, 0);
        assert_eq!(score.total, 2);
        assert_eq!(score.percent, 0.0);
    }

    #[test]
    fn length_mismatch_is_invalid() {
        let surplus = Score::tally(&labels(&["A", "B", "C"]), &labels(&["A"])).unwrap_err();
        assert!(matches!(surplus, ValidationError::InvalidArgument(_)));

        let short = Score::tally(&labels(&["A"]), &labels(&["A", "B"])).unwrap_err();
        assert!(matches!(short, ValidationError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn mismatched_submission_skips_the_model() {
        let (provider, evaluator) = evaluator(ScriptedProvider::new(vec![]));
        let err = evaluator
            .evaluate(&labels(&["A", "B"]), &labels(&["A"]), "Cells")
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidArgument(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn model_failure_keeps_score_and_flags_error() {
        let (_, evaluator) = evaluator(ScriptedProvider::failing(ProviderError::Network(
            "reset".into(),
        )));
        let result = evaluator
            .evaluate(&labels(&["A", "B", "C"]), &labels(&["A", "B", "C"]), "Cells")
            .await
            .unwrap();

        assert_eq!(result.score, 100.0);
        assert_eq!(result.suggested_difficulty, Difficulty::Hard);
        assert!(result.feedback.contains("3 of 3"));
        assert!(result.error.unwrap().contains("reset"));
    }
}
