//! Question routing by keyword.
//!
//! Classification is a case-insensitive substring test against two fixed
//! phrase lists. It never fails and never calls the model.

use serde::Serialize;

/// Greetings, small talk and questions about the conversation itself.
const GENERAL_PATTERNS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "how are you",
    "what is your name",
    "who are you",
    "remember",
    "my name is",
    "i am",
    "what is my",
    "do you remember",
    "good morning",
    "good evening",
    "thanks",
    "thank you",
];

/// Phrases that point explicitly at the student's own materials.
const CONTEXT_PATTERNS: &[&str] = &[
    "according to",
    "in the material",
    "in my notes",
    "from the document",
    "in the course",
    "in my syllabus",
    "from my",
    "what does the material say",
];

/// Both flags computed for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionIntent {
    pub general: bool,
    pub context_required: bool,
}

impl QuestionIntent {
    /// Whether the question should skip retrieval.
    ///
    /// A general question goes to the model directly unless
    /// `explicit_reference_forces_retrieval` is set and the question also
    /// names the student's materials.
    pub fn skips_retrieval(&self, explicit_reference_forces_retrieval: bool) -> bool {
        self.general && !(explicit_reference_forces_retrieval && self.context_required)
    }
}

pub struct ModeSelector;

impl ModeSelector {
    pub fn classify(question: &str) -> QuestionIntent {
        let lowered = question.to_lowercase();
        QuestionIntent {
            general: contains_any(&lowered, GENERAL_PATTERNS),
            context_required: contains_any(&lowered, CONTEXT_PATTERNS),
        }
    }

    pub fn is_general(question: &str) -> bool {
        Self::classify(question).general
    }

    pub fn requires_course_context(question: &str) -> bool {
        Self::classify(question).context_required
    }
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}
