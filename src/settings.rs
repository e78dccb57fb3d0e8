use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_MAX_REQUESTS, DEFAULT_RESEND_API_URL, DEFAULT_RESEND_FROM,
    DEFAULT_SITE_NAME, DEFAULT_SWEEP_INTERVAL, DEFAULT_SWEEP_PROBABILITY, DEFAULT_WINDOW,
};
use crate::limiter::rate_limiter::RateLimitPolicy;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Shown in the footer of every notification email.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub email: EmailSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Humantime duration, e.g. "15m".
    #[serde(default = "default_window")]
    pub window: String,

    #[serde(default = "default_sweep_probability")]
    pub sweep_probability: f64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

/// Outbound email settings. Every value is optional here: a missing
/// credential is reported when a submission reaches the mailer, not at boot.
#[derive(Deserialize, Clone, Default)]
pub struct EmailSettings {
    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default)]
    pub resend_api_url: Option<String>,

    #[serde(default)]
    pub resend_from: Option<String>,

    #[serde(default)]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    #[serde(default)]
    pub aws_secret_access_key: Option<String>,

    #[serde(default)]
    pub aws_region: Option<String>,

    #[serde(default)]
    pub aws_ses_from_email: Option<String>,

    #[serde(default)]
    pub aws_ses_to_email: Option<String>,

    /// Overrides the regional SES endpoint (local stacks, tests).
    #[serde(default)]
    pub aws_ses_endpoint: Option<String>,
}

#[derive(Clone)]
pub struct ResendSettings {
    pub api_key: Option<Zeroizing<String>>,
    pub api_url: String,
    pub from: String,
    pub to: Option<String>,
}

#[derive(Clone)]
pub struct SesSettings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<Zeroizing<String>>,
    pub region: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub endpoint: String,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Contact-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}
fn default_max_requests() -> u32 {
    DEFAULT_MAX_REQUESTS
}
fn default_window() -> String {
    DEFAULT_WINDOW.to_string()
}
fn default_sweep_probability() -> f64 {
    DEFAULT_SWEEP_PROBABILITY
}
fn default_sweep_interval() -> String {
    DEFAULT_SWEEP_INTERVAL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            site_name: default_site_name(),
            rate_limit: RateLimitSettings::default(),
            email: EmailSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        RateLimitSettings {
            max_requests: default_max_requests(),
            window: default_window(),
            sweep_probability: default_sweep_probability(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.email = config.email.with_conventional_env();

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.rate_limit.max_requests == 0 {
            errors.push("RATE_LIMIT max_requests must be greater than zero".to_string());
        }
        if let Err(e) = self.rate_limit.policy() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.rate_limit.sweep_interval() {
            errors.push(e.to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl RateLimitSettings {
    pub fn policy(&self) -> Result<RateLimitPolicy, ConfigError> {
        let window = parse_duration("rate_limit.window", &self.window)?;
        let window = chrono::Duration::from_std(window)
            .map_err(|_| ConfigError::Message(format!("rate_limit.window is too large: {}", self.window)))?;

        if window <= chrono::Duration::zero() {
            return Err(ConfigError::Message("rate_limit.window must be greater than zero".into()));
        }
        if !(0.0..=1.0).contains(&self.sweep_probability) {
            return Err(ConfigError::Message(format!(
                "rate_limit.sweep_probability must be within [0, 1], got {}",
                self.sweep_probability
            )));
        }

        Ok(RateLimitPolicy {
            max_requests: self.max_requests,
            window,
            sweep_probability: self.sweep_probability,
        })
    }

    pub fn sweep_interval(&self) -> Result<Duration, ConfigError> {
        let interval = parse_duration("rate_limit.sweep_interval", &self.sweep_interval)?;
        if interval.is_zero() {
            return Err(ConfigError::Message("rate_limit.sweep_interval must be greater than zero".into()));
        }
        Ok(interval)
    }
}

fn parse_duration(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim())
        .map_err(|e| ConfigError::Message(format!("{key} is not a valid duration ({raw}): {e}")))
}

impl EmailSettings {
    /// Falls back to the provider's conventional variable names
    /// (`RESEND_API_KEY`, `AWS_ACCESS_KEY_ID`, ...) for anything the
    /// `APP_EMAIL__*` sources left unset.
    pub fn with_conventional_env(mut self) -> Self {
        fill_from_env(&mut self.resend_api_key, "RESEND_API_KEY");
        fill_from_env(&mut self.contact_email, "CONTACT_EMAIL");
        fill_from_env(&mut self.aws_access_key_id, "AWS_ACCESS_KEY_ID");
        fill_from_env(&mut self.aws_secret_access_key, "AWS_SECRET_ACCESS_KEY");
        fill_from_env(&mut self.aws_region, "AWS_REGION");
        fill_from_env(&mut self.aws_ses_from_email, "AWS_SES_FROM_EMAIL");
        fill_from_env(&mut self.aws_ses_to_email, "AWS_SES_TO_EMAIL");
        self
    }

    pub fn resend(&self) -> ResendSettings {
        ResendSettings {
            api_key: non_empty(&self.resend_api_key).map(Zeroizing::new),
            api_url: non_empty(&self.resend_api_url)
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
            from: non_empty(&self.resend_from).unwrap_or_else(|| DEFAULT_RESEND_FROM.to_string()),
            to: non_empty(&self.contact_email),
        }
    }

    pub fn ses(&self) -> SesSettings {
        let region = non_empty(&self.aws_region).unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());
        let endpoint = non_empty(&self.aws_ses_endpoint)
            .unwrap_or_else(|| format!("https://email.{region}.amazonaws.com"));

        SesSettings {
            access_key_id: non_empty(&self.aws_access_key_id),
            secret_access_key: non_empty(&self.aws_secret_access_key).map(Zeroizing::new),
            region,
            from: non_empty(&self.aws_ses_from_email),
            to: non_empty(&self.aws_ses_to_email),
            endpoint,
        }
    }
}

fn fill_from_env(slot: &mut Option<String>, env_key: &str) {
    if non_empty(slot).is_none() {
        *slot = env::var(env_key).ok().filter(|v| !v.trim().is_empty());
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[MISSING]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("site_name", &self.site_name)
            .field("rate_limit", &self.rate_limit)
            .field("email", &self.email)
            .finish()
    }
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("resend_from", &self.resend_from)
            .field("contact_email", &self.contact_email)
            .field("aws_access_key_id", &self.aws_access_key_id.redact())
            .field("aws_secret_access_key", &self.aws_secret_access_key.redact())
            .field("aws_region", &self.aws_region)
            .field("aws_ses_from_email", &self.aws_ses_from_email)
            .field("aws_ses_to_email", &self.aws_ses_to_email)
            .field("aws_ses_endpoint", &self.aws_ses_endpoint)
            .finish()
    }
}
