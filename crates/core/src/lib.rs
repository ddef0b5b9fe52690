//! # RustedTutor Core
//!
//! Domain types, traits, and error definitions for the RustedTutor
//! tutoring runtime. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Both external collaborators (the generative model and the retrieval
//! service) are defined as traits here. Implementations live in their
//! respective crates, which keeps the orchestration layer testable with
//! scripted stand-ins.

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod tutoring;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ParseError, ProviderError, Result, RetrievalError, ValidationError};
pub use message::{ConversationTurn, Message, Role, TurnRole};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use retrieval::{RetrievalQuery, RetrievedChunk, Retriever};
pub use tutoring::{
    AnswerMode, AnswerResult, Difficulty, EvaluationResult, Flashcard, FlashcardResult,
    QuizQuestion, QuizResult, SocraticResult, SourceRef,
};
