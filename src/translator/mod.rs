//! Translation backends.
//!
//! The reconciliation core only sees the [`Translator`] trait: a catalog of
//! source strings goes in, the same keys with translated text come out.
//!
//! - `google`: Google Cloud Translation v2 (API key auth)
//! - `openai`: OpenAI chat completions, asked to answer with a JSON catalog

mod google;
mod openai;

pub use google::GoogleTranslator;
pub use openai::OpenAiTranslator;

use crate::catalog::Catalog;
use crate::config::TranslatorConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Failure of a single translation call.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// The backend answered with a non-success status.
    #[error("translation API error ({status}): {body}")]
    Api {
        status: u16,
        body: String,
        /// Wait requested by the server through `Retry-After`, in whole seconds
        retry_after: Option<Duration>,
    },

    /// The request never got a response (DNS, TLS, timeout, ...).
    #[error("failed to reach translation API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 2xx but the payload could not be used.
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

impl TranslateError {
    /// An API error without a server-requested wait
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        TranslateError::Api {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Turn a non-success response into an error, keeping its body and `Retry-After`.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));

        TranslateError::Api {
            status,
            body,
            retry_after,
        }
    }

    /// How long the server asked us to wait before trying again
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TranslateError::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Structured detail carried by the error (the API response body), if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            TranslateError::Api { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Text to show the user: the structured detail when present, else the error itself.
    pub fn report(&self) -> String {
        match self.detail() {
            Some(detail) => detail.to_string(),
            None => self.to_string(),
        }
    }

    /// Rate limits, server errors and transport failures are worth another attempt.
    /// Other 4xx responses (bad key, bad request) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Api { status, .. } => *status == 429 || *status >= 500,
            TranslateError::Transport(_) => true,
            TranslateError::MalformedResponse(_) => false,
        }
    }
}

/// A text-translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate every value of `request` into `language` (an ISO 639-1 code).
    ///
    /// The result holds the same categories and keys. Empty or `null` values
    /// are passed through untouched, and an empty request yields an empty result.
    async fn translate(&self, request: Catalog, language: &str) -> Result<Catalog, TranslateError>;
}

/// Build the configured backend translating from `source_language`.
pub fn from_config(
    config: &TranslatorConfig,
    client: reqwest::Client,
    source_language: &str,
) -> Arc<dyn Translator> {
    match config {
        TranslatorConfig::Google { api_key, api_url } => Arc::new(GoogleTranslator::new(
            client,
            api_key.clone(),
            api_url.clone(),
            source_language.to_string(),
        )),
        TranslatorConfig::OpenAi {
            api_key,
            model,
            api_url,
        } => Arc::new(OpenAiTranslator::new(
            client,
            api_key.clone(),
            model.clone(),
            api_url.clone(),
            source_language.to_string(),
        )),
    }
}

/// Non-empty strings of a request, in catalog order, with their location.
pub(crate) fn translatable_texts(request: &Catalog) -> Vec<(String, String, String)> {
    request
        .iter()
        .flat_map(|(category, entries)| {
            entries.iter().filter_map(move |(key, value)| match value {
                Some(text) if !text.is_empty() => {
                    Some((category.clone(), key.clone(), text.clone()))
                }
                _ => None,
            })
        })
        .collect()
}
