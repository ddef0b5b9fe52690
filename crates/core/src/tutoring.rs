//! Tutoring artifacts — the typed results handed back to callers.
//!
//! Every orchestration operation returns one of these. Degraded outcomes
//! are represented in the payload itself (an `error` field or apologetic
//! text), never as a Rust error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ParseError;

/// Routing outcome of an answer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Greeting / personal / memory question answered from general knowledge
    General,
    /// Caller asked for all materials; answered from general knowledge
    KnowledgeBase,
    /// No chunks matched; general answer with a disclaimer
    Fallback,
    /// Answer grounded in retrieved chunks
    DocumentBased,
    /// Retrieval or model failure
    Error,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::KnowledgeBase => "knowledge_base",
            Self::Fallback => "fallback",
            Self::DocumentBased => "document_based",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source excerpt cited with a grounded answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub content: String,
    pub similarity: f32,
}

/// Result of answering a student question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub mode: AnswerMode,
}

/// Quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a caller-supplied difficulty; anything unrecognized is medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    /// Difficulty to suggest for the next quiz given a percentage score.
    pub fn suggested_for_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Hard
        } else if score >= 50.0 {
            Self::Medium
        } else {
            Self::Easy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option labels every quiz question must carry.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// A four-option multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Check the question has exactly options A-D and a valid answer.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.question.trim().is_empty() {
            return Err(ParseError::Schema("question text is empty".into()));
        }
        let labels: Vec<&str> = self.options.keys().map(String::as_str).collect();
        if labels != OPTION_LABELS {
            return Err(ParseError::Schema(format!(
                "expected options A, B, C, D but got {}",
                labels.join(", ")
            )));
        }
        if !self.options.contains_key(&self.correct_answer) {
            return Err(ParseError::Schema(format!(
                "correct_answer '{}' is not one of the options",
                self.correct_answer
            )));
        }
        Ok(())
    }
}

/// Result of quiz generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub topic: String,
    pub difficulty: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A study flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// Result of flashcard generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardResult {
    pub topic: String,
    pub flashcards: Vec<Flashcard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Score and feedback for a submitted quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub feedback: String,
    pub suggested_difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Guiding questions for Socratic mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocraticResult {
    pub questions: Vec<String>,
    pub hint: String,
}
