//! Centralized default constants for the berean system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// INGESTION
// =============================================================================

/// Default number of candidate videos requested from the catalog per batch.
pub const FETCH_LIMIT: u32 = 10;

/// Transcripts shorter than this are treated as unavailable and the video
/// is skipped. A quality gate, not an error path.
pub const TRANSCRIPT_MIN_CHARS: usize = 100;

// =============================================================================
// GENERATION
// =============================================================================

/// Maximum transcript prefix (in characters) included in the generation
/// prompt, keeping the request within the service's input limits.
pub const TRANSCRIPT_PROMPT_CAP: usize = 15_000;

/// Required number of multiple-choice questions per lesson.
pub const QUESTIONS_MULTIPLE_CHOICE: usize = 3;

/// Required number of fill-in-the-blank questions per lesson.
pub const QUESTIONS_FILL_IN_BLANK: usize = 2;

/// Required number of scripture-match questions per lesson.
pub const QUESTIONS_SCRIPTURE_MATCH: usize = 2;

/// Required number of true/false questions per lesson.
pub const QUESTIONS_TRUE_FALSE: usize = 2;

/// Total questions per generated lesson (3 + 2 + 2 + 2).
pub const QUESTIONS_TOTAL: usize = QUESTIONS_MULTIPLE_CHOICE
    + QUESTIONS_FILL_IN_BLANK
    + QUESTIONS_SCRIPTURE_MATCH
    + QUESTIONS_TRUE_FALSE;

/// Minimum number of key themes in generated content.
pub const KEY_THEMES_MIN: usize = 3;

/// Maximum number of key themes in generated content.
pub const KEY_THEMES_MAX: usize = 5;

/// Minimum options for a choice-style question.
pub const CHOICE_OPTIONS_MIN: usize = 3;

/// Maximum options for a choice-style question.
pub const CHOICE_OPTIONS_MAX: usize = 4;

/// Sampling temperature for lesson generation: creative but grounded.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Output token budget for a generation call.
pub const GENERATION_MAX_TOKENS: u32 = 3000;

/// Per-request timeout for generation calls, in seconds.
pub const GENERATION_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// NOTIFICATION
// =============================================================================

/// Recipients per concurrent send batch (provider rate-limit friendly).
pub const EMAIL_BATCH_SIZE: usize = 10;

/// Delay between send batches, in milliseconds.
pub const EMAIL_BATCH_DELAY_MS: u64 = 1000;

/// Per-request timeout for email sends, in seconds.
pub const EMAIL_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// EXTERNAL APIS
// =============================================================================

/// Per-request timeout for video catalog calls, in seconds.
pub const CATALOG_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout for transcript fetches, in seconds.
pub const TRANSCRIPT_TIMEOUT_SECS: u64 = 30;
