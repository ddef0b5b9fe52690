//! LLM Provider implementations for RustedTutor.
//!
//! All providers implement the `rustedtutor_core::Provider` trait.
//! The router selects the correct provider based on configuration and
//! wraps it with the timeout/retry policy.

pub mod openai_compat;
pub mod resilient;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use resilient::ResilientProvider;
pub use router::{ProviderRouter, build_from_config, default_provider};
