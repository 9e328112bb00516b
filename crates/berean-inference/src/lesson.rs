//! Lesson content generation over the chat completion backend.
//!
//! Builds the structured prompt, requests a JSON-mode completion, and
//! validates the parsed shape before returning it. Anything short of a
//! complete, well-formed response is `Error::GenerationMalformed`, so the
//! orchestrator skips the video instead of persisting partial content.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use berean_core::{defaults, Error, GeneratedContent, LessonGenerator, Result};

use crate::openai::OpenAiBackend;

const SYSTEM_PROMPT: &str = "You are an expert Bible teacher and curriculum designer. \
Create engaging, theologically sound learning materials.";

/// Content generator backed by an OpenAI-compatible service.
pub struct OpenAiLessonGenerator {
    backend: OpenAiBackend,
}

impl OpenAiLessonGenerator {
    /// Create a generator over the given backend.
    pub fn new(backend: OpenAiBackend) -> Self {
        Self { backend }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(OpenAiBackend::from_env()?))
    }
}

/// Truncate to at most `cap` characters, respecting char boundaries.
fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the structured user prompt for one video.
fn build_prompt(transcript: &str, video_title: &str, video_description: &str) -> String {
    let excerpt = truncate_chars(transcript, defaults::TRANSCRIPT_PROMPT_CAP);
    format!(
        r#"You are an expert in creating engaging Bible study materials. Analyze the following church message and create comprehensive learning content.

MESSAGE TITLE: {title}

MESSAGE DESCRIPTION: {description}

TRANSCRIPT:
{excerpt}

Please provide:

1. A concise, engaging lesson title (4-8 words) that captures the core teaching - NOT the video title
2. A concise summary (2-3 paragraphs) of the main message
3. Key themes (3-5 main themes covered)
4. Scripture references mentioned (with book, chapter, and verse)
5. Learning questions in the following types:
   - 3 multiple choice questions
   - 2 fill-in-the-blank questions
   - 2 scripture matching questions
   - 2 true/false questions

Format your response as a single JSON object with this structure:
{{
  "lessonTitle": "Walking in Faith and Purpose",
  "summary": "...",
  "keyThemes": ["theme1", "theme2", "theme3"],
  "scriptureReferences": ["John 3:16", "Romans 8:28"],
  "questions": [
    {{
      "type": "multiple_choice",
      "questionText": "What was the main point of the message?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": "Option B",
      "explanation": "The pastor emphasized...",
      "xpValue": 10
    }},
    {{
      "type": "fill_in_blank",
      "questionText": "The message focused on the importance of _____ in our daily walk.",
      "correctAnswer": "faith",
      "explanation": "Faith was mentioned as...",
      "xpValue": 15
    }},
    {{
      "type": "scripture_match",
      "questionText": "Match the verse to its reference: 'For God so loved the world...'",
      "options": ["John 3:16", "Romans 5:8", "1 John 4:19", "Ephesians 2:8"],
      "correctAnswer": "John 3:16",
      "explanation": "This is one of the most famous verses...",
      "xpValue": 10
    }},
    {{
      "type": "true_false",
      "questionText": "The pastor said that faith without works is dead.",
      "correctAnswer": "true",
      "explanation": "This comes from James 2:26...",
      "xpValue": 5
    }}
  ]
}}

Multiple choice and scripture matching questions must include the correct answer among their options. Make sure questions are engaging, test understanding, and promote spiritual growth."#,
        title = video_title,
        description = video_description,
        excerpt = excerpt,
    )
}

#[async_trait]
impl LessonGenerator for OpenAiLessonGenerator {
    async fn generate(
        &self,
        transcript: &str,
        video_title: &str,
        video_description: &str,
    ) -> Result<GeneratedContent> {
        let start = Instant::now();
        let prompt = build_prompt(transcript, video_title, video_description);

        let raw = self.backend.complete_json(SYSTEM_PROMPT, &prompt).await?;

        let content: GeneratedContent = serde_json::from_str(&raw).map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "lesson",
                error = %e,
                response_len = raw.len(),
                "Generation reply failed to parse"
            );
            Error::GenerationMalformed(format!("unparseable response: {}", e))
        })?;

        content.validate()?;

        info!(
            subsystem = "inference",
            component = "lesson",
            op = "generate",
            model = %self.backend.config().model,
            question_count = content.questions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated lesson content"
        );

        Ok(content)
    }
}
