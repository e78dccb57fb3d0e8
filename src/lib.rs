use std::sync::Arc;

use config::ConfigError;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{auth, limiter, mailer, utils};

use limiter::rate_limiter::RateLimiter;
use mailer::{provider::EmailProvider, resend::ResendProvider, ses::SesProvider};
use use_cases::contact::ContactHandler;

/// Shared state for every worker. Both contact endpoints count against the
/// same limiter.
pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    pub resend_contact: ContactHandler,
    pub ses_contact: ContactHandler,
}

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Result<Self, ConfigError> {
        let policy = config.rate_limit.policy()?;
        let rate_limiter = Arc::new(RateLimiter::in_memory(policy));
        let client = reqwest::Client::new();

        let resend = Arc::new(ResendProvider::new(client.clone(), config.email.resend()));
        let ses = Arc::new(SesProvider::new(client, config.email.ses()));

        Ok(Self::with_providers(rate_limiter, resend, ses, &config.site_name))
    }

    pub fn with_providers(
        rate_limiter: Arc<RateLimiter>,
        resend: Arc<dyn EmailProvider>,
        ses: Arc<dyn EmailProvider>,
        site_name: &str,
    ) -> Self {
        AppState {
            resend_contact: ContactHandler::new(rate_limiter.clone(), resend, site_name),
            ses_contact: ContactHandler::new(rate_limiter.clone(), ses, site_name),
            rate_limiter,
        }
    }
}
