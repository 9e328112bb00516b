//! HTTP-level tests for the OpenAI-compatible backend and lesson
//! generator, using a local mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use berean_core::{Error, LessonGenerator};
use berean_inference::mock::sample_generated_content;
use berean_inference::{OpenAiBackend, OpenAiConfig, OpenAiLessonGenerator};

fn test_config(base_url: String) -> OpenAiConfig {
    OpenAiConfig {
        base_url,
        api_key: Some("test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        timeout_seconds: 5,
        ..OpenAiConfig::default()
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_complete_json_sends_bearer_and_json_mode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{\"ok\":true}")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(test_config(server.uri())).unwrap();
    let reply = backend.complete_json("system", "user").await.unwrap();
    assert_eq!(reply, "{\"ok\":true}");
}

#[tokio::test]
async fn test_generator_parses_and_validates_full_shape() {
    let server = MockServer::start().await;

    let content = sample_generated_content("Breakthrough Through Prayer");
    let content_json = serde_json::to_string(&content).unwrap();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(&content_json)))
        .mount(&server)
        .await;

    let generator =
        OpenAiLessonGenerator::new(OpenAiBackend::new(test_config(server.uri())).unwrap());
    let generated = generator
        .generate("a transcript", "Video Title", "Description")
        .await
        .unwrap();

    assert_eq!(generated.lesson_title, "Breakthrough Through Prayer");
    assert_eq!(generated.questions.len(), 9);
}

#[tokio::test]
async fn test_generator_rejects_incomplete_shape() {
    let server = MockServer::start().await;

    // Parseable JSON, but missing the required question mixture.
    let body = completion_body(
        r#"{"lessonTitle":"T","summary":"S","keyThemes":["a","b","c"],"scriptureReferences":[],"questions":[]}"#,
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let generator =
        OpenAiLessonGenerator::new(OpenAiBackend::new(test_config(server.uri())).unwrap());
    let result = generator.generate("t", "v", "d").await;
    assert!(matches!(result, Err(Error::GenerationMalformed(_))));
}

#[tokio::test]
async fn test_generator_rejects_unparseable_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("not json at all")))
        .mount(&server)
        .await;

    let generator =
        OpenAiLessonGenerator::new(OpenAiBackend::new(test_config(server.uri())).unwrap());
    assert!(matches!(
        generator.generate("t", "v", "d").await,
        Err(Error::GenerationMalformed(_))
    ));
}

#[tokio::test]
async fn test_service_error_maps_to_generation_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(test_config(server.uri())).unwrap();
    assert!(matches!(
        backend.complete_json("s", "u").await,
        Err(Error::GenerationMalformed(_))
    ));
}
