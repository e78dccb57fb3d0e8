use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const CSRF_HEADER: &str = "x-csrf-token";

pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// 5 submissions per 15 minutes per client.
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW: &str = "15m";
pub const DEFAULT_SWEEP_PROBABILITY: f64 = 0.1;
pub const DEFAULT_SWEEP_INTERVAL: &str = "60s";

pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_RESEND_FROM: &str = "Contact Form <onboarding@resend.dev>";
pub const DEFAULT_AWS_REGION: &str = "ap-south-1";
pub const DEFAULT_SITE_NAME: &str = "bharathloganathan.dev";

/// Largest contact request body read before validation gives up.
pub const MAX_CONTACT_BODY_BYTES: usize = 64 * 1024;
