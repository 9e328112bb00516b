//! Mock lesson generator for deterministic testing.
//!
//! Produces a fixed, contract-valid [`GeneratedContent`] by default, and
//! can be scripted to fail for specific video titles to exercise the
//! orchestrator's failure isolation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use berean_core::{
    Error, GeneratedContent, GeneratedQuestion, LessonGenerator, QuestionType, Result,
};

/// A contract-valid fixed content sample.
pub fn sample_generated_content(lesson_title: &str) -> GeneratedContent {
    let choice = |text: &str| GeneratedQuestion {
        question_type: QuestionType::MultipleChoice,
        question_text: text.to_string(),
        options: Some(vec![
            "Prayer".to_string(),
            "Fasting".to_string(),
            "Giving".to_string(),
            "Serving".to_string(),
        ]),
        correct_answer: "Prayer".to_string(),
        explanation: Some("Emphasized throughout the message.".to_string()),
        xp_value: 10,
    };
    let blank = |text: &str| GeneratedQuestion {
        question_type: QuestionType::FillInBlank,
        question_text: text.to_string(),
        options: None,
        correct_answer: "faith".to_string(),
        explanation: None,
        xp_value: 15,
    };
    let scripture = |text: &str| GeneratedQuestion {
        question_type: QuestionType::ScriptureMatch,
        question_text: text.to_string(),
        options: Some(vec![
            "John 3:16".to_string(),
            "Romans 8:28".to_string(),
            "Matthew 17:21".to_string(),
        ]),
        correct_answer: "Matthew 17:21".to_string(),
        explanation: Some("Quoted directly.".to_string()),
        xp_value: 10,
    };
    let tf = |text: &str| GeneratedQuestion {
        question_type: QuestionType::TrueFalse,
        question_text: text.to_string(),
        options: None,
        correct_answer: "true".to_string(),
        explanation: None,
        xp_value: 5,
    };

    GeneratedContent {
        lesson_title: lesson_title.to_string(),
        summary: "The message calls believers to persistent prayer and fasting, \
                  positioning themselves for breakthrough."
            .to_string(),
        key_themes: vec![
            "prayer".to_string(),
            "fasting".to_string(),
            "breakthrough".to_string(),
        ],
        scripture_references: vec!["Matthew 17:21".to_string(), "Daniel 10:2-3".to_string()],
        questions: vec![
            choice("What discipline did the message center on?"),
            choice("What unlocks supernatural breakthrough?"),
            choice("What is our direct communication with God?"),
            blank("The message focused on _____ in our daily walk."),
            blank("Fasting demonstrates our _____ for more of God."),
            scripture("Match: 'This kind does not go out except by prayer and fasting'"),
            scripture("Match: the three-week fast that brought angelic breakthrough"),
            tf("The speaker said fasting is only an occasional practice."),
            tf("Prayer and fasting are described as weapons in spiritual warfare."),
        ],
    }
}

/// Scripted mock implementation of [`LessonGenerator`].
#[derive(Clone)]
pub struct MockLessonGenerator {
    lesson_title: String,
    fail_for_titles: Arc<HashSet<String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLessonGenerator {
    /// Create a mock that always succeeds with a fixed lesson title.
    pub fn new() -> Self {
        Self {
            lesson_title: "Prayer That Moves Mountains".to_string(),
            fail_for_titles: Arc::new(HashSet::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the generated lesson title.
    pub fn with_lesson_title(mut self, title: impl Into<String>) -> Self {
        self.lesson_title = title.into();
        self
    }

    /// Fail with `GenerationMalformed` whenever the given video title is
    /// generated for.
    pub fn failing_for(mut self, video_title: impl Into<String>) -> Self {
        let mut titles = (*self.fail_for_titles).clone();
        titles.insert(video_title.into());
        self.fail_for_titles = Arc::new(titles);
        self
    }

    /// Video titles this mock has been asked to generate for, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockLessonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LessonGenerator for MockLessonGenerator {
    async fn generate(
        &self,
        _transcript: &str,
        video_title: &str,
        _video_description: &str,
    ) -> Result<GeneratedContent> {
        self.calls.lock().unwrap().push(video_title.to_string());
        if self.fail_for_titles.contains(video_title) {
            return Err(Error::GenerationMalformed(format!(
                "scripted failure for {}",
                video_title
            )));
        }
        Ok(sample_generated_content(&self.lesson_title))
    }
}
