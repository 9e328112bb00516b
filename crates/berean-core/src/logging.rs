//! Structured logging field name constants for berean.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, per-video outcomes, batch summaries |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

/// Subsystem originating the log event.
/// Values: "api", "db", "ingest", "inference", "notify"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pipeline", "youtube", "openai", "pool", "email"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "run_batch", "process_video", "generate", "notify_all"
pub const OPERATION: &str = "op";

/// External (YouTube) video identifier being operated on.
pub const YOUTUBE_ID: &str = "youtube_id";

/// Video row UUID.
pub const VIDEO_ID: &str = "video_id";

/// Lesson row UUID.
pub const LESSON_ID: &str = "lesson_id";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of items returned or processed.
pub const RESULT_COUNT: &str = "result_count";

/// Transcript length in characters.
pub const TRANSCRIPT_LEN: &str = "transcript_len";

/// Model name used for generation.
pub const MODEL: &str = "model";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
