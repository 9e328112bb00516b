//! # berean-inference
//!
//! Generative-text backend for berean lesson content.
//!
//! Wraps an OpenAI-compatible chat completions API in JSON-output mode
//! and validates the structured lesson shape before anything downstream
//! sees it.

pub mod lesson;
pub mod mock;
pub mod openai;
pub mod types;

pub use lesson::OpenAiLessonGenerator;
pub use mock::MockLessonGenerator;
pub use openai::{OpenAiBackend, OpenAiConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL};
