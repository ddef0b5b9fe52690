//! Tolerant parsing of model output.
//!
//! Models wrap JSON in markdown fences, prepend chatter, or return the
//! array under a key. We accept all of those and drop individual items
//! that fail validation instead of failing the whole batch.

use rustedtutor_core::error::ParseError;
use rustedtutor_core::tutoring::{Flashcard, QuizQuestion};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Remove one leading fence (with optional language tag) and one trailing fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse model output as a JSON array of `T`.
///
/// Items that do not deserialize, or that `accept` rejects, are skipped.
/// Returns an error only if nothing usable remains.
pub fn parse_json_array<T, F>(raw: &str, accept: F) -> Result<Vec<T>, ParseError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), ParseError>,
{
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let items = extract_array(body)?;
    if items.is_empty() {
        return Err(ParseError::Empty);
    }

    let total = items.len();
    let mut parsed = Vec::with_capacity(total);
    let mut last_error = None;
    for item in items {
        let outcome = serde_json::from_value::<T>(item)
            .map_err(|e| ParseError::Schema(e.to_string()))
            .and_then(|value| accept(&value).map(|()| value));
        match outcome {
            Ok(value) => parsed.push(value),
            Err(e) => {
                warn!(error = %e, "Dropping malformed item from model output");
                last_error = Some(e);
            }
        }
    }

    if parsed.is_empty() {
        return Err(last_error.unwrap_or(ParseError::Empty));
    }
    if parsed.len() < total {
        warn!(kept = parsed.len(), total, "Some generated items were invalid");
    }
    Ok(parsed)
}

pub fn parse_quiz_questions(raw: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    parse_json_array(raw, QuizQuestion::validate)
}

pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, ParseError> {
    parse_json_array(raw, |card: &Flashcard| {
        if card.front.trim().is_empty() || card.back.trim().is_empty() {
            Err(ParseError::Schema("flashcard front and back must be non-empty".into()))
        } else {
            Ok(())
        }
    })
}

/// Lines that start with a digit or hyphen, with list markers stripped.
pub fn parse_guiding_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| {
            line.chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '-')
        })
        .map(|line| {
            line.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | ')' | ' '))
                .to_string()
        })
        .filter(|q| !q.is_empty())
        .collect()
}

fn extract_array(body: &str) -> Result<Vec<Value>, ParseError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(Value::Object(map)) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ParseError::Schema("expected a JSON array".into())),
        Ok(_) => Err(ParseError::Schema("expected a JSON array".into())),
        Err(e) => bracketed(body)
            .and_then(|inner| serde_json::from_str::<Vec<Value>>(inner).ok())
            .ok_or_else(|| ParseError::InvalidJson(e.to_string())),
    }
}

/// The span from the first `[` to the last `]`, for arrays wrapped in prose.
fn bracketed(body: &str) -> Option<&str> {
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    (start < end).then(|| &body[start..=end])
}
