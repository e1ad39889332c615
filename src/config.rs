use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub const DEFAULT_GOOGLE_TRANSLATE_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub folders: Folders,

    // Translation backend
    pub translator: TranslatorConfig,
}

/// Where the catalogs of a run live
#[derive(Debug, Clone, PartialEq)]
pub struct Folders {
    /// Holds exactly one template catalog
    pub source_of_truth: PathBuf,
    /// Holds one catalog per target language
    pub output: PathBuf,
    /// Holds at most one updates catalog; may not exist
    pub updates: PathBuf,
}

impl Folders {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = |name: &str, default: &str| -> PathBuf {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
                .into()
        };

        Self {
            source_of_truth: dir("SOURCE_OF_TRUTH_DIR", "./source_of_truth/"),
            output: dir("OUTPUT_DIR", "./output/"),
            updates: dir("UPDATES_DIR", "./updates/"),
        }
    }
}

/// Which backend translates requests, with its credentials.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatorConfig {
    Google {
        api_key: String,
        api_url: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        api_url: String,
    },
}

impl TranslatorConfig {
    /// Short backend name for logs
    pub fn name(&self) -> &'static str {
        match self {
            TranslatorConfig::Google { .. } => "google",
            TranslatorConfig::OpenAi { .. } => "openai",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let translator = match var("TRANSLATOR")
            .unwrap_or_else(|| "google".to_string())
            .to_lowercase()
            .as_str()
        {
            "google" => TranslatorConfig::Google {
                api_key: var("GOOGLE_API_KEY").context("GOOGLE_API_KEY not set")?,
                api_url: var("GOOGLE_TRANSLATE_URL")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_TRANSLATE_URL.to_string()),
            },
            "openai" => TranslatorConfig::OpenAi {
                api_key: var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_url: var("OPENAI_API_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            },
            other => bail!("Unknown TRANSLATOR '{}'. Expected 'google' or 'openai'", other),
        };

        Ok(Self {
            folders: Folders::from_lookup(&lookup),
            translator,
        })
    }
}
