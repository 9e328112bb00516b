//! Video ingestion for berean.
//!
//! This crate turns a channel's recent YouTube uploads into persisted
//! lessons: the [`pipeline::IngestPipeline`] orchestrator drives the
//! catalog lister, transcript provider, content generator, store, and
//! email notifier implemented here and in the sibling crates.

pub mod notifier;
pub mod pipeline;
pub mod testing;
pub mod transcript;
pub mod youtube;

pub use notifier::{DisabledNotifier, EmailConfig, EmailNotifier};
pub use pipeline::{IngestConfig, IngestPipeline, VideoOutcome};
pub use transcript::{HttpTranscriptSource, PlaceholderTranscripts};
pub use youtube::{YouTubeClient, YouTubeConfig};
