use super::{translatable_texts, TranslateError, Translator};
use crate::catalog::Catalog;
use crate::retry::{send_with_retry, RetryPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Google Translation v2 accepts at most 128 `q` segments per call
const MAX_SEGMENTS_PER_REQUEST: usize = 128;

/// Google Cloud Translation (v2 REST, API key auth)
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    source_language: String,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: Vec<&'a str>,
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        api_url: String,
        source_language: String,
    ) -> Self {
        Self {
            client,
            api_key,
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

    /// Translate one batch of segments, keeping their order
    async fn translate_batch(
        &self,
        segments: &[&str],
        language: &str,
    ) -> Result<Vec<String>, TranslateError> {
        let body = TranslateRequest {
            q: segments.to_vec(),
            target: language,
            source: &self.source_language,
            format: "text",
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslateError::from_response(response).await);
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

        let translations = parsed.data.translations;
        if translations.len() != segments.len() {
            return Err(TranslateError::MalformedResponse(format!(
                "expected {} translations, got {}",
                segments.len(),
                translations.len()
            )));
        }

        Ok(translations.into_iter().map(|t| t.translated_text).collect())
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, request: Catalog, language: &str) -> Result<Catalog, TranslateError> {
        let texts = translatable_texts(&request);
        if texts.is_empty() {
            return Ok(request);
        }

        let mut result = request;
        for chunk in texts.chunks(MAX_SEGMENTS_PER_REQUEST) {
            let segments: Vec<&str> = chunk.iter().map(|(_, _, text)| text.as_str()).collect();
            debug!(
                "Google: translating {} segments {} -> {}",
                segments.len(),
                self.source_language,
                language
            );

            let translated = send_with_retry(
                &self.retry,
                &format!("Google translation to {}", language),
                || self.translate_batch(&segments, language),
            )
            .await?;

            for ((category, key, _), text) in chunk.iter().zip(translated) {
                result.insert(category.as_str(), key.as_str(), Some(text));
            }
        }

        Ok(result)
    }
}
