use super::{translatable_texts, TranslateError, Translator};
use crate::catalog::Catalog;
use crate::retry::{send_with_retry, RetryPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most strings sent in one chat completion
const MAX_STRINGS_PER_REQUEST: usize = 60;

/// Most source characters sent in one chat completion
const MAX_CHARS_PER_REQUEST: usize = 4000;

/// `(category, key, text)` of one string to translate
type Segment = (String, String, String);

/// OpenAI Chat Completion request for catalog translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Split `segments` into runs of at most `max_strings` strings and `max_chars`
/// characters, keeping their order. A longer single string is sent on its own.
fn chunk_segments(segments: &[Segment], max_strings: usize, max_chars: usize) -> Vec<&[Segment]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (i, (_, _, text)) in segments.iter().enumerate() {
        let len = text.chars().count();
        if i > start && (i - start == max_strings || chars + len > max_chars) {
            chunks.push(&segments[start..i]);
            start = i;
            chars = 0;
        }
        chars += len;
    }
    if start < segments.len() {
        chunks.push(&segments[start..]);
    }

    chunks
}

/// Build the system prompt for catalog translation
fn build_translation_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        r#"You are a professional software localizer. Translate UI strings from the language with ISO 639-1 code "{}" to the language with ISO 639-1 code "{}".

## Input and output
- The input is a JSON object of categories, each mapping keys to source strings.
- Answer with a single JSON object with exactly the same categories and keys.
- Replace every value with its translation. Never translate or rename keys.

## DO NOT translate:
- Placeholders such as {{name}}, {{{{count}}}}, %s, %d, %1$s
- HTML tags and entities
- URLs and e-mail addresses
- Product and brand names

## Style:
- Keep the length close to the source; these strings appear in a user interface
- Preserve leading/trailing whitespace, punctuation and line breaks"#,
        source_language, target_language
    )
}

/// Build the user prompt carrying the catalog to translate
fn build_translation_user_prompt(payload: &str) -> String {
    format!("Translate the values of this JSON object:\n\n{}", payload)
}

/// OpenAI chat-completions backend answering with a JSON catalog
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    source_language: String,
    retry: RetryPolicy,
}

impl OpenAiTranslator {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        api_url: String,
        source_language: String,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            api_url,
            source_language,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (tests use short delays)
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(&self, payload: &str, target_language: &str) -> TranslationRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_translation_system_prompt(&self.source_language, target_language),
                },
                Message {
                    role: "user".to_string(),
                    content: build_translation_user_prompt(payload),
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { 4000 },
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }

    async fn complete(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslateError::from_response(response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

        let choice = chat_response.choices.into_iter().next().ok_or_else(|| {
            TranslateError::MalformedResponse("response contained no choices".to_string())
        })?;

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(TranslateError::MalformedResponse(
                "reply was cut off at the completion token limit".to_string(),
            ));
        }

        Ok(choice.message.content)
    }

    /// Translate one chunk of strings, returning the model's reply as a catalog
    async fn translate_chunk(
        &self,
        segments: &[Segment],
        language: &str,
    ) -> Result<Catalog, TranslateError> {
        let mut payload = Catalog::new();
        for (category, key, text) in segments {
            payload.insert(category.as_str(), key.as_str(), Some(text.clone()));
        }
        let payload = payload
            .to_pretty_json()
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

        debug!("OpenAI: translating {} strings to {}", segments.len(), language);
        let chat_request = self.build_request(&payload, language);

        let content = send_with_retry(
            &self.retry,
            &format!("OpenAI translation to {}", language),
            || self.complete(&chat_request),
        )
        .await?;

        Catalog::from_json(content.trim()).map_err(|e| {
            TranslateError::MalformedResponse(format!("reply is not a catalog: {}", e))
        })
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, request: Catalog, language: &str) -> Result<Catalog, TranslateError> {
        let texts = translatable_texts(&request);
        if texts.is_empty() {
            return Ok(request);
        }

        // Only non-empty strings go to the model, a chunk at a time
        let mut reply = Catalog::new();
        for chunk in chunk_segments(&texts, MAX_STRINGS_PER_REQUEST, MAX_CHARS_PER_REQUEST) {
            for (category, entries) in self.translate_chunk(chunk, language).await? {
                reply.category_mut(&category).extend(entries);
            }
        }

        // Pass empty values through, take translated ones, leave out keys the model dropped
        let mut result = Catalog::new();
        for (category, entries) in request {
            let slot = result.category_mut(&category);
            for (key, value) in entries {
                match value {
                    Some(text) if !text.is_empty() => {
                        if let Some(translated) = reply.value(&category, &key) {
                            if !translated.is_empty() {
                                slot.insert(key, Some(translated.to_string()));
                            }
                        }
                    }
                    untouched => {
                        slot.insert(key, untouched);
                    }
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_translator(server: &MockServer, model: &str) -> OpenAiTranslator {
        OpenAiTranslator::new(
            reqwest::Client::new(),
            "test-openai-key".to_string(),
            model.to_string(),
            format!("{}/v1/chat/completions", server.uri()),
            "en".to_string(),
        )
        .with_retry(RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50)))
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn catalog(json: serde_json::Value) -> Catalog {
        serde_json::from_value(json).expect("valid catalog")
    }

    fn segments(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| ("a".to_string(), format!("k{}", i), text.to_string()))
            .collect()
    }

    // ==================== Chunking Tests ====================

    #[test]
    fn test_chunk_segments_by_count() {
        let segments = segments(&["a", "b", "c", "d", "e"]);

        let sizes: Vec<usize> = chunk_segments(&segments, 2, 1000).iter().map(|c| c.len()).collect();

        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_chunk_segments_by_characters() {
        let segments = segments(&["aaaa", "bbbb", "cc", "dddddddddd", "e"]);

        let chunks = chunk_segments(&segments, 100, 10);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();

        // The 10-character string fills a chunk by itself
        assert_eq!(sizes, vec![3, 1, 1]);
        assert_eq!(chunks[1][0].2, "dddddddddd");
    }

    #[test]
    fn test_chunk_segments_oversized_string_alone() {
        let long = "x".repeat(50);
        let segments = segments(&[long.as_str(), "y"]);

        let sizes: Vec<usize> = chunk_segments(&segments, 100, 10).iter().map(|c| c.len()).collect();

        assert_eq!(sizes, vec![1, 1]);
    }

    #[test]
    fn test_chunk_segments_empty() {
        assert!(chunk_segments(&[], 10, 10).is_empty());
    }

    // ==================== Model Tests ====================

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_build_translation_system_prompt() {
        let prompt = build_translation_system_prompt("en", "fr");

        assert!(prompt.contains(r#""en""#));
        assert!(prompt.contains(r#""fr""#));
        assert!(prompt.contains("DO NOT translate"));
        assert!(prompt.contains("{name}"));
        assert!(prompt.contains("{{count}}"));
        assert!(prompt.contains("%1$s"));
        assert!(prompt.contains("Never translate or rename keys"));
    }

    #[test]
    fn test_build_translation_user_prompt() {
        let prompt = build_translation_user_prompt(r#"{"a": {"x": "Hi"}}"#);
        assert!(prompt.contains(r#"{"a": {"x": "Hi"}}"#));
    }

    // ==================== Request Tests ====================

    #[test]
    fn test_request_uses_temperature_for_chat_models() {
        let translator = OpenAiTranslator::new(
            reqwest::Client::new(),
            "k".to_string(),
            "gpt-4o-mini".to_string(),
            "http://localhost".to_string(),
            "en".to_string(),
        );

        let json = serde_json::to_value(translator.build_request("{}", "de")).unwrap();

        let temperature = json["temperature"].as_f64().expect("temperature set");
        assert!((temperature - 0.3).abs() < 1e-6);
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["max_completion_tokens"], 4000);
        assert!(json.get("reasoning_effort").is_none());
    }

    #[test]
    fn test_request_uses_reasoning_effort_for_reasoning_models() {
        let translator = OpenAiTranslator::new(
            reqwest::Client::new(),
            "k".to_string(),
            "o4-mini".to_string(),
            "http://localhost".to_string(),
            "en".to_string(),
        );

        let json = serde_json::to_value(translator.build_request("{}", "de")).unwrap();

        assert!(json.get("temperature").is_none());
        assert_eq!(json["reasoning_effort"], "low");
        assert_eq!(json["max_completion_tokens"], 16000);
    }

    // ==================== Integration Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(
                r#"{"greeting": {"hello": "Hallo"}, "farewell": {"bye": "Tschüss"}}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = catalog(serde_json::json!({
            "greeting": {"hello": "Hello", "blank": ""},
            "farewell": {"bye": "Bye"},
            "empty": {}
        }));

        let result = create_translator(&server, "gpt-4o-mini")
            .translate(request, "de")
            .await
            .expect("Should succeed");

        assert_eq!(
            result,
            catalog(serde_json::json!({
                "greeting": {"hello": "Hallo", "blank": ""},
                "farewell": {"bye": "Tschüss"},
                "empty": {}
            }))
        );
    }

    #[tokio::test]
    async fn test_translate_large_catalog_in_chunks() {
        let server = MockServer::start().await;

        // Only the second chunk carries the last key
        let last_key = format!("k{}", MAX_STRINGS_PER_REQUEST);
        Mock::given(method("POST"))
            .and(body_string_contains(last_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(
                &format!(r#"{{"bulk": {{"{}": "last"}}}}"#, last_key),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let first_reply: serde_json::Map<String, serde_json::Value> = (0..MAX_STRINGS_PER_REQUEST)
            .map(|i| (format!("k{}", i), serde_json::Value::String(format!("t{}", i))))
            .collect();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(
                &serde_json::json!({"bulk": first_reply}).to_string(),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = Catalog::new();
        for i in 0..=MAX_STRINGS_PER_REQUEST {
            request.insert("bulk", format!("k{}", i), Some(format!("s{}", i)));
        }

        let result = create_translator(&server, "gpt-4o-mini")
            .translate(request, "de")
            .await
            .expect("Should succeed");

        assert_eq!(result.entry_count(), MAX_STRINGS_PER_REQUEST + 1);
        assert_eq!(result.value("bulk", "k0"), Some("t0"));
        assert_eq!(result.value("bulk", &last_key), Some("last"));
    }

    #[tokio::test]
    async fn test_translate_cut_off_reply_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": r#"{"a": {"x": "Ei"#},
                    "finish_reason": "length"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One"}})), "de")
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::MalformedResponse(_)));
        assert!(err.to_string().contains("token limit"));
    }

    #[tokio::test]
    async fn test_translate_leaves_out_dropped_keys() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(
                r#"{"a": {"x": "Eins"}}"#,
            )))
            .mount(&server)
            .await;

        let result = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One", "y": "Two"}})), "de")
            .await
            .expect("Should succeed");

        assert_eq!(result, catalog(serde_json::json!({"a": {"x": "Eins"}})));
    }

    #[tokio::test]
    async fn test_translate_non_json_reply_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("Sure! Here it is")),
            )
            .mount(&server)
            .await;

        let err = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One"}})), "de")
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_translate_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One"}})), "de")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_translate_auth_error_not_retried() {
        let server = MockServer::start().await;
        let body = r#"{"error": {"message": "Incorrect API key provided"}}"#;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let err = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One"}})), "de")
            .await
            .unwrap_err();

        assert_eq!(err.detail(), Some(body));
    }

    #[tokio::test]
    async fn test_translate_rate_limit_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(
                r#"{"a": {"x": "Uno"}}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = create_translator(&server, "gpt-4o-mini")
            .translate(catalog(serde_json::json!({"a": {"x": "One"}})), "es")
            .await
            .expect("Should succeed after retry");

        assert_eq!(result.value("a", "x"), Some("Uno"));
    }

    #[tokio::test]
    async fn test_translate_empty_request_makes_no_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let request = catalog(serde_json::json!({"a": {"x": ""}}));
        let result = create_translator(&server, "gpt-4o-mini")
            .translate(request.clone(), "es")
            .await
            .expect("Should succeed");

        assert_eq!(result, request);
    }
}
