//! Core data models for berean.
//!
//! These types are shared across all berean crates and represent the core
//! domain entities: source videos, derived lessons and quiz questions, and
//! per-user progress state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// VIDEO TYPES
// =============================================================================

/// A source video from the external catalog, as persisted.
///
/// The `youtube_id` is globally unique; the uniqueness constraint is what
/// makes the initial insert the claim point for concurrent ingest runs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
    pub transcript: Option<String>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// Normalized video metadata returned by the Source Video Lister, before
/// any persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVideo {
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
}

/// Insert payload for a newly discovered video.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
}

impl From<SourceVideo> for NewVideo {
    fn from(v: SourceVideo) -> Self {
        Self {
            youtube_id: v.youtube_id,
            title: v.title,
            description: v.description,
            published_at: v.published_at,
            thumbnail_url: v.thumbnail_url,
            duration_seconds: v.duration_seconds,
        }
    }
}

// =============================================================================
// LESSON TYPES
// =============================================================================

/// A derived educational unit generated from one source video's transcript.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub video_id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_themes: Vec<String>,
    pub scripture_references: Vec<String>,
    pub is_published: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a lesson.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub video_id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_themes: Vec<String>,
    pub scripture_references: Vec<String>,
    pub is_published: bool,
    pub order_index: i32,
}

// =============================================================================
// QUESTION TYPES
// =============================================================================

/// Closed set of quiz question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    ScriptureMatch,
    TrueFalse,
}

impl QuestionType {
    /// Choice-style questions must carry an options list containing the
    /// correct answer.
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::ScriptureMatch)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleChoice => write!(f, "multiple_choice"),
            Self::FillInBlank => write!(f, "fill_in_blank"),
            Self::ScriptureMatch => write!(f, "scripture_match"),
            Self::TrueFalse => write!(f, "true_false"),
        }
    }
}

/// One quiz item belonging to a lesson.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub question_type: QuestionType,
    pub question_text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub xp_value: i32,
    pub order_index: i32,
}

/// Insert payload for a question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub lesson_id: Uuid,
    pub question_type: QuestionType,
    pub question_text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub xp_value: i32,
    pub order_index: i32,
}

// =============================================================================
// GENERATED CONTENT
// =============================================================================

/// Structured output contract for the Content Generator.
///
/// Field names mirror the JSON the generation service is instructed to
/// produce. The shape is validated with [`GeneratedContent::validate`]
/// before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub lesson_title: String,
    pub summary: String,
    pub key_themes: Vec<String>,
    pub scripture_references: Vec<String>,
    pub questions: Vec<GeneratedQuestion>,
}

/// One generated quiz question, prior to persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub xp_value: i32,
}

impl GeneratedContent {
    /// Validate the generated shape against the generation contract.
    ///
    /// Rejects anything that would persist partial or inconsistent lesson
    /// content: empty title/summary, a theme count outside 3–5, a question
    /// mixture other than 3 multiple-choice / 2 fill-in-blank / 2
    /// scripture-match / 2 true-false, blank question text or answers,
    /// non-positive XP, and choice-style questions whose options are
    /// missing, out of the 3–4 range, or do not include the correct answer.
    pub fn validate(&self) -> Result<()> {
        if self.lesson_title.trim().is_empty() {
            return Err(Error::GenerationMalformed("empty lesson title".into()));
        }
        if self.summary.trim().is_empty() {
            return Err(Error::GenerationMalformed("empty summary".into()));
        }
        let themes = self.key_themes.len();
        if !(defaults::KEY_THEMES_MIN..=defaults::KEY_THEMES_MAX).contains(&themes) {
            return Err(Error::GenerationMalformed(format!(
                "expected {}-{} key themes, got {}",
                defaults::KEY_THEMES_MIN,
                defaults::KEY_THEMES_MAX,
                themes
            )));
        }
        if self.questions.len() != defaults::QUESTIONS_TOTAL {
            return Err(Error::GenerationMalformed(format!(
                "expected {} questions, got {}",
                defaults::QUESTIONS_TOTAL,
                self.questions.len()
            )));
        }

        let count = |ty: QuestionType| {
            self.questions
                .iter()
                .filter(|q| q.question_type == ty)
                .count()
        };
        let mixture = [
            (QuestionType::MultipleChoice, defaults::QUESTIONS_MULTIPLE_CHOICE),
            (QuestionType::FillInBlank, defaults::QUESTIONS_FILL_IN_BLANK),
            (QuestionType::ScriptureMatch, defaults::QUESTIONS_SCRIPTURE_MATCH),
            (QuestionType::TrueFalse, defaults::QUESTIONS_TRUE_FALSE),
        ];
        for (ty, expected) in mixture {
            let got = count(ty);
            if got != expected {
                return Err(Error::GenerationMalformed(format!(
                    "expected {} {} questions, got {}",
                    expected, ty, got
                )));
            }
        }

        for (i, q) in self.questions.iter().enumerate() {
            q.validate()
                .map_err(|e| Error::GenerationMalformed(format!("question {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Convert to insert payloads tied to a lesson, preserving generation
    /// order as dense zero-based order indices.
    pub fn to_new_questions(&self, lesson_id: Uuid) -> Vec<NewQuestion> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| NewQuestion {
                lesson_id,
                question_type: q.question_type,
                question_text: q.question_text.clone(),
                options: q.options.clone(),
                correct_answer: q.correct_answer.clone(),
                explanation: q.explanation.clone(),
                xp_value: q.xp_value,
                order_index: i as i32,
            })
            .collect()
    }
}

impl GeneratedQuestion {
    fn validate(&self) -> Result<()> {
        if self.question_text.trim().is_empty() {
            return Err(Error::GenerationMalformed("empty question text".into()));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(Error::GenerationMalformed("empty correct answer".into()));
        }
        if self.xp_value <= 0 {
            return Err(Error::GenerationMalformed(format!(
                "non-positive xp value {}",
                self.xp_value
            )));
        }
        if self.question_type.requires_options() {
            let options = self.options.as_deref().ok_or_else(|| {
                Error::GenerationMalformed(format!(
                    "{} question missing options",
                    self.question_type
                ))
            })?;
            let n = options.len();
            if !(defaults::CHOICE_OPTIONS_MIN..=defaults::CHOICE_OPTIONS_MAX).contains(&n) {
                return Err(Error::GenerationMalformed(format!(
                    "expected {}-{} options, got {}",
                    defaults::CHOICE_OPTIONS_MIN,
                    defaults::CHOICE_OPTIONS_MAX,
                    n
                )));
            }
            if !options.iter().any(|o| o == &self.correct_answer) {
                return Err(Error::GenerationMalformed(
                    "correct answer not present in options".into(),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// USER STATE TYPES
// =============================================================================

/// A registered user (notification recipient and progress owner).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Per-question attempt state, unique per (user, question).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub question_id: Uuid,
    pub is_correct: bool,
    pub attempts: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated gamification state, unique per user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStats {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_xp: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub lessons_completed: i32,
    pub questions_answered: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Best-score completion record, unique per (user, lesson).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub score: i32,
    pub total_xp_earned: i32,
    pub completed_at: DateTime<Utc>,
}

/// Free-text study notes, unique per (user, lesson).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonNote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Record one question attempt (idempotent upsert per user+question).
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAttemptRequest {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub question_id: Uuid,
    pub is_correct: bool,
    #[serde(default)]
    pub xp_earned: i32,
}

/// Record a lesson completion; the best score seen is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteLessonRequest {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub score: i32,
    pub total_xp_earned: i32,
}

/// Save free-text notes for a user+lesson pair.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveNotesRequest {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    #[serde(default)]
    pub notes: String,
}

// =============================================================================
// INGEST SUMMARY
// =============================================================================

/// Digest of one lesson created during a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDigest {
    pub lesson_id: Uuid,
    pub title: String,
    pub question_count: usize,
}

/// Structured result of one ingestion batch.
///
/// Batch endpoints always return this summary, even on partial failure;
/// only total lister failure surfaces as an error response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Candidates returned by the lister.
    pub discovered: usize,
    /// Videos claimed and inserted this run.
    pub new_videos: usize,
    /// Lessons fully persisted this run.
    pub lessons_created: usize,
    /// Candidates skipped because the claim found an existing row.
    pub skipped_existing: usize,
    /// Candidates skipped by the recency cutoff.
    pub skipped_stale: usize,
    /// Videos left unprocessed for lack of a usable transcript.
    pub skipped_no_transcript: usize,
    /// Videos left unprocessed after a failed or malformed generation.
    pub generation_failures: usize,
    /// Videos whose persistence steps failed mid-way.
    pub persistence_failures: usize,
    /// Notification emails delivered.
    pub emails_sent: usize,
    /// Notification emails that failed to deliver.
    pub emails_failed: usize,
    /// Lessons created this run, in processing order.
    pub lessons: Vec<LessonDigest>,
}

/// Delivery counts from a notification fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Lesson metadata carried into the notification template.
#[derive(Debug, Clone)]
pub struct NewLessonEmail {
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub summary: String,
    pub video_title: String,
    pub published_at: DateTime<Utc>,
    pub app_url: String,
}

// =============================================================================
// FORMATTING HELPERS
// =============================================================================

/// Format a duration in seconds as `h:mm:ss` (or `m:ss` under an hour).
pub fn format_duration(seconds: i32) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question(ty: QuestionType) -> GeneratedQuestion {
        let options = if ty.requires_options() {
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        } else {
            None
        };
        GeneratedQuestion {
            question_type: ty,
            question_text: "What was the main point?".to_string(),
            options,
            correct_answer: if ty.requires_options() {
                "B".to_string()
            } else {
                "faith".to_string()
            },
            explanation: Some("Covered in the opening.".to_string()),
            xp_value: 10,
        }
    }

    fn sample_content() -> GeneratedContent {
        let mut questions = Vec::new();
        for _ in 0..3 {
            questions.push(sample_question(QuestionType::MultipleChoice));
        }
        for _ in 0..2 {
            questions.push(sample_question(QuestionType::FillInBlank));
        }
        for _ in 0..2 {
            questions.push(sample_question(QuestionType::ScriptureMatch));
        }
        for _ in 0..2 {
            questions.push(sample_question(QuestionType::TrueFalse));
        }
        GeneratedContent {
            lesson_title: "Walking in Faith and Purpose".to_string(),
            summary: "A study of faith in daily life.".to_string(),
            key_themes: vec!["faith".into(), "purpose".into(), "prayer".into()],
            scripture_references: vec!["John 3:16".into(), "Romans 8:28".into()],
            questions,
        }
    }

    #[test]
    fn test_valid_content_passes() {
        assert!(sample_content().validate().is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut content = sample_content();
        content.lesson_title = "  ".to_string();
        assert!(matches!(
            content.validate(),
            Err(Error::GenerationMalformed(_))
        ));
    }

    #[test]
    fn test_wrong_question_count_rejected() {
        let mut content = sample_content();
        content.questions.pop();
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_wrong_mixture_rejected() {
        let mut content = sample_content();
        // Swap a true/false for an extra multiple choice: still 9 total.
        content.questions.pop();
        content
            .questions
            .push(sample_question(QuestionType::MultipleChoice));
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_theme_count_bounds() {
        let mut content = sample_content();
        content.key_themes = vec!["one".into(), "two".into()];
        assert!(content.validate().is_err());

        content.key_themes = (0..6).map(|i| format!("theme{}", i)).collect();
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_choice_question_missing_answer_in_options() {
        let mut content = sample_content();
        content.questions[0].correct_answer = "not an option".to_string();
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_choice_question_missing_options() {
        let mut content = sample_content();
        content.questions[0].options = None;
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_non_positive_xp_rejected() {
        let mut content = sample_content();
        content.questions[3].xp_value = 0;
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_to_new_questions_dense_zero_based_order() {
        let content = sample_content();
        let lesson_id = Uuid::new_v4();
        let questions = content.to_new_questions(lesson_id);
        assert_eq!(questions.len(), 9);
        for (i, q) in questions.iter().enumerate() {
            assert_eq!(q.order_index, i as i32);
            assert_eq!(q.lesson_id, lesson_id);
        }
    }

    #[test]
    fn test_generated_content_json_contract() {
        // The wire format uses the generation service's camelCase names.
        let json = r#"{
            "lessonTitle": "Prayer That Moves Mountains",
            "summary": "Summary text.",
            "keyThemes": ["prayer", "fasting", "breakthrough"],
            "scriptureReferences": ["Matthew 17:21"],
            "questions": [{
                "type": "true_false",
                "questionText": "The message covered fasting.",
                "correctAnswer": "true",
                "explanation": "Yes.",
                "xpValue": 5
            }]
        }"#;
        let content: GeneratedContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.lesson_title, "Prayer That Moves Mountains");
        assert_eq!(content.questions[0].question_type, QuestionType::TrueFalse);
        assert_eq!(content.questions[0].xp_value, 5);
    }

    #[test]
    fn test_question_type_display_matches_serde() {
        for ty in [
            QuestionType::MultipleChoice,
            QuestionType::FillInBlank,
            QuestionType::ScriptureMatch,
            QuestionType::TrueFalse,
        ] {
            let serialized = serde_json::to_string(&ty).unwrap();
            assert_eq!(serialized, format!("\"{}\"", ty));
        }
    }

    #[test]
    fn test_requires_options() {
        assert!(QuestionType::MultipleChoice.requires_options());
        assert!(QuestionType::ScriptureMatch.requires_options());
        assert!(!QuestionType::FillInBlank.requires_options());
        assert!(!QuestionType::TrueFalse.requires_options());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
        assert_eq!(format_duration(-5), "0:00");
    }
}
