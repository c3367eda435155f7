//! Agent configuration (code > env, `.env` honored).

use std::str::FromStr;

/// Expertise level of the end user, used to shape the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserLevel {
    Expert,
    Beginner,
    #[default]
    General,
}

impl UserLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Beginner => "beginner",
            Self::General => "general",
        }
    }
}

impl FromStr for UserLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "expert" => Ok(Self::Expert),
            "beginner" => Ok(Self::Beginner),
            "general" => Ok(Self::General),
            other => Err(format!("unknown user level: {other}")),
        }
    }
}

/// Configuration for the research agent.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Model identifier sent to the provider (e.g. `gpt-oss:120b-cloud`).
    pub model_name: String,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: String,
    /// Optional bearer key; local endpoints usually need none.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub user_level: UserLevel,
    /// Safety ceiling on provider invocations per query. The two-step
    /// policy keeps real runs well under this.
    pub max_iterations: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-oss:120b-cloud".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            temperature: 0.3,
            user_level: UserLevel::General,
            max_iterations: 10,
        }
    }
}

impl ResearchConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Reads `MAGPIE_MODEL`, `MAGPIE_BASE_URL`, `MAGPIE_API_KEY`,
    /// `MAGPIE_TEMPERATURE` and `MAGPIE_USER_LEVEL`. A `.env` file is
    /// loaded first when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(model) = std::env::var("MAGPIE_MODEL") {
            config.model_name = model;
        }
        if let Ok(url) = std::env::var("MAGPIE_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(key) = std::env::var("MAGPIE_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(temp) = std::env::var("MAGPIE_TEMPERATURE") {
            if let Ok(parsed) = temp.parse() {
                config.temperature = parsed;
            }
        }
        if let Ok(level) = std::env::var("MAGPIE_USER_LEVEL") {
            if let Ok(parsed) = level.parse() {
                config.user_level = parsed;
            }
        }

        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_user_level(mut self, level: UserLevel) -> Self {
        self.user_level = level;
        self
    }

    pub fn with_max_iterations(mut self, ceiling: u32) -> Self {
        self.max_iterations = ceiling;
        self
    }
}
