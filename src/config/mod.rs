pub mod cli;

use crate::domain::model::MessageKind;
use crate::utils::error::{MailerError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
pub const MAILJET_BASE_URL: &str = "https://api.mailjet.com";
pub const RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub sender: SenderConfig,
    pub providers: ProvidersConfig,
    pub ai: AiConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// How long shutdown waits for queued welcome emails.
    pub shutdown_grace_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            shutdown_grace_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub from_email: String,
    pub from_name: String,
    /// Resend only accepts verified domains, so it gets its own identity.
    pub resend_from: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            from_email: "visionboard@visionboard2026.com".to_string(),
            from_name: "Vision Board 2026".to_string(),
            resend_from: "Vision Board 2026 <onboarding@resend.dev>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub timeout_seconds: u64,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_base_url: String,
    pub mailjet_api_key: Option<String>,
    pub mailjet_secret_key: Option<String>,
    pub mailjet_base_url: String,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 20,
            sendgrid_api_key: None,
            sendgrid_base_url: SENDGRID_BASE_URL.to_string(),
            mailjet_api_key: None,
            mailjet_secret_key: None,
            mailjet_base_url: MAILJET_BASE_URL.to_string(),
            resend_api_key: None,
            resend_base_url: RESEND_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiBackendKind {
    Deepseek,
    Gemini,
}

impl AiBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AiBackendKind::Deepseek => "deepseek",
            AiBackendKind::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub timeout_seconds: u64,
    pub deepseek_api_key: Option<String>,
    pub deepseek_base_url: String,
    pub deepseek_model: String,
    pub max_tokens: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub welcome_order: Vec<AiBackendKind>,
    pub daily_order: Vec<AiBackendKind>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            deepseek_api_key: None,
            deepseek_base_url: DEEPSEEK_BASE_URL.to_string(),
            deepseek_model: "deepseek-chat".to_string(),
            max_tokens: 200,
            gemini_api_key: None,
            gemini_base_url: GEMINI_BASE_URL.to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            // welcome favors DeepSeek, daily favors Gemini (higher quota)
            welcome_order: vec![AiBackendKind::Deepseek, AiBackendKind::Gemini],
            daily_order: vec![AiBackendKind::Gemini, AiBackendKind::Deepseek],
        }
    }
}

impl AiConfig {
    pub fn order_for(&self, kind: MessageKind) -> &[AiBackendKind] {
        match kind {
            MessageKind::Welcome => &self.welcome_order,
            MessageKind::Daily => &self.daily_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Daily run time, `HH:MM` UTC.
    pub run_at: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: 3,
            batch_delay_ms: 2000,
            run_at: "08:00".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn run_time(&self) -> Result<NaiveTime> {
        validation::parse_time_of_day("scheduler.run_at", &self.run_at)
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match non_empty_env(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MailerError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw,
                reason: "Not a valid number".to_string(),
            }),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML after replacing `${VAR}` references with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| MailerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        config.store.endpoint = non_empty_env("STORE_URL")
            .or_else(|| non_empty_env("GOOGLE_SCRIPT_URL"))
            .ok_or_else(|| MailerError::MissingConfigError {
                field: "STORE_URL".to_string(),
            })?;

        if let Some(addr) = non_empty_env("BIND_ADDR") {
            config.server.bind_addr = addr;
        }

        config.providers.sendgrid_api_key = non_empty_env("SENDGRID_API_KEY");
        config.providers.mailjet_api_key = non_empty_env("MAILJET_API_KEY");
        config.providers.mailjet_secret_key = non_empty_env("MAILJET_SECRET_KEY");
        config.providers.resend_api_key = non_empty_env("RESEND_API_KEY");

        config.ai.deepseek_api_key = non_empty_env("DEEPSEEK_API_KEY");
        config.ai.gemini_api_key = non_empty_env("GEMINI_API_KEY");

        if let Some(size) = parse_env("BATCH_SIZE")? {
            config.scheduler.batch_size = size;
        }
        if let Some(delay) = parse_env("BATCH_DELAY_MS")? {
            config.scheduler.batch_delay_ms = delay;
        }
        if let Some(run_at) = non_empty_env("DAILY_RUN_AT") {
            config.scheduler.run_at = run_at;
        }

        Ok(config)
    }

    /// Names of credentials that are absent. Those back-ends will fail and be skipped over.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let checks = [
            ("SENDGRID_API_KEY", &self.providers.sendgrid_api_key),
            ("MAILJET_API_KEY", &self.providers.mailjet_api_key),
            ("MAILJET_SECRET_KEY", &self.providers.mailjet_secret_key),
            ("RESEND_API_KEY", &self.providers.resend_api_key),
            ("DEEPSEEK_API_KEY", &self.ai.deepseek_api_key),
            ("GEMINI_API_KEY", &self.ai.gemini_api_key),
        ];
        checks
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("store.endpoint", &self.store.endpoint)?;
        validation::validate_url("providers.sendgrid_base_url", &self.providers.sendgrid_base_url)?;
        validation::validate_url("providers.mailjet_base_url", &self.providers.mailjet_base_url)?;
        validation::validate_url("providers.resend_base_url", &self.providers.resend_base_url)?;
        validation::validate_url("ai.deepseek_base_url", &self.ai.deepseek_base_url)?;
        validation::validate_url("ai.gemini_base_url", &self.ai.gemini_base_url)?;

        validation::validate_email("sender.from_email", &self.sender.from_email)?;

        validation::validate_positive_number("scheduler.batch_size", self.scheduler.batch_size, 1)?;
        validation::validate_range("scheduler.batch_delay_ms", self.scheduler.batch_delay_ms, 0, 60_000)?;
        self.scheduler.run_time()?;

        if self.ai.welcome_order.is_empty() || self.ai.daily_order.is_empty() {
            return Err(MailerError::InvalidConfigValueError {
                field: "ai.welcome_order/ai.daily_order".to_string(),
                value: "[]".to_string(),
                reason: "At least one AI backend must be listed".to_string(),
            });
        }

        for name in self.missing_credentials() {
            tracing::warn!("⚠️ {} is not set; that back-end will always fail over", name);
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
