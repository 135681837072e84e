use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use url::Url;

/// Roughly a year. Larger reset intervals are refused.
pub const MAX_RESET_INTERVAL_HOURS: i64 = 24 * 366;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    pub max_age: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreditsConfig {
    pub free_max: u32,
    pub premium_max: u32,
    pub reset_interval_hours: i64,
    pub check_interval_minutes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    pub text_cap: usize,
    pub image_cap: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    pub text_endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: String,
    pub referer: String,
    pub title: String,
    pub image_endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PremiumConfig {
    pub emails_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub credits: CreditsConfig,
    pub history: HistoryConfig,
    pub generation: GenerationConfig,
    pub premium: PremiumConfig,
}

fn with_defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("environment", environment)?
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.workers", num_cpus::get() as i64)?
        .set_default("cors.enabled", true)?
        .set_default("cors.allow_any_origin", false)?
        .set_default("cors.max_age", 3600)?
        .set_default("storage.data_dir", ".genora")?
        .set_default("credits.free_max", 10)?
        .set_default("credits.premium_max", 100)?
        .set_default("credits.reset_interval_hours", 24)?
        .set_default("credits.check_interval_minutes", 60)?
        .set_default("history.text_cap", 50)?
        .set_default("history.image_cap", 20)?
        .set_default("generation.text_endpoint", "https://openrouter.ai/api/v1/chat/completions")?
        .set_default("generation.model", "deepseek-chat")?
        .set_default("generation.temperature", 0.7)?
        .set_default("generation.max_tokens", 800)?
        .set_default("generation.api_key", "")?
        .set_default("generation.referer", "https://yourdomain.com")?
        .set_default("generation.title", "Genora AI")?
        .set_default("generation.image_endpoint", "https://own-ai.onrender.com/api/v1/generateImage")?
        .set_default(
            "generation.user_agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.1",
        )?
        .set_default("generation.timeout_secs", 60)?
        .set_default(
            "premium.emails_url",
            "https://raw.githubusercontent.com/codespacexx/main1/refs/heads/main/Fr.text",
        )
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = with_defaults("development")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Built-in defaults only, with a caller-chosen data directory.
    /// Environment variables are ignored so tests stay hermetic.
    pub fn new_for_test(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        let settings: Settings = with_defaults("test")?
            .set_override("storage.data_dir", data_dir.to_string_lossy().to_string())?
            .set_override("server.workers", 1)?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("generation.text_endpoint", &self.generation.text_endpoint),
            ("generation.image_endpoint", &self.generation.image_endpoint),
            ("premium.emails_url", &self.premium.emails_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Message(format!("{key} is not a valid URL: {e}")))?;
        }

        if self.credits.premium_max < self.credits.free_max {
            return Err(ConfigError::Message(
                "credits.premium_max must not be below credits.free_max".into(),
            ));
        }
        if self.credits.reset_interval_hours <= 0 || self.credits.check_interval_minutes == 0 {
            return Err(ConfigError::Message("credit intervals must be positive".into()));
        }
        if self.credits.reset_interval_hours > MAX_RESET_INTERVAL_HOURS {
            return Err(ConfigError::Message(format!(
                "credits.reset_interval_hours must not exceed {MAX_RESET_INTERVAL_HOURS}"
            )));
        }
        if self.history.text_cap == 0 || self.history.image_cap == 0 {
            return Err(ConfigError::Message("history caps must be positive".into()));
        }
        Ok(())
    }
}
