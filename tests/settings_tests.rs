use std::time::Duration;

use portfolio_contact::{
    limiter::rate_limiter::RateLimitPolicy,
    settings::{AppConfig, EmailSettings, RateLimitSettings},
};

#[test]
fn default_rate_limit_settings_match_default_policy() {
    let settings = RateLimitSettings::default();

    assert_eq!(settings.policy().unwrap(), RateLimitPolicy::default());
    assert_eq!(settings.sweep_interval().unwrap(), Duration::from_secs(60));
}

#[test]
fn rate_limit_window_accepts_humantime() {
    let settings = RateLimitSettings {
        max_requests: 3,
        window: "1h 30m".into(),
        ..RateLimitSettings::default()
    };

    let policy = settings.policy().unwrap();
    assert_eq!(policy.max_requests, 3);
    assert_eq!(policy.window, chrono::Duration::minutes(90));
}

#[test]
fn invalid_rate_limit_settings_are_rejected() {
    let bad_window = RateLimitSettings {
        window: "soon".into(),
        ..RateLimitSettings::default()
    };
    assert!(bad_window.policy().is_err());

    let zero_window = RateLimitSettings {
        window: "0s".into(),
        ..RateLimitSettings::default()
    };
    assert!(zero_window.policy().is_err());

    let bad_probability = RateLimitSettings {
        sweep_probability: 1.5,
        ..RateLimitSettings::default()
    };
    assert!(bad_probability.policy().is_err());

    let zero_interval = RateLimitSettings {
        sweep_interval: "0s".into(),
        ..RateLimitSettings::default()
    };
    assert!(zero_interval.sweep_interval().is_err());
}

#[test]
fn email_defaults_fill_provider_settings() {
    let email = EmailSettings::default();

    let resend = email.resend();
    assert!(resend.api_key.is_none());
    assert_eq!(resend.api_url, "https://api.resend.com");
    assert_eq!(resend.from, "Contact Form <onboarding@resend.dev>");

    let ses = email.ses();
    assert_eq!(ses.region, "ap-south-1");
    assert_eq!(ses.endpoint, "https://email.ap-south-1.amazonaws.com");
}

#[test]
fn blank_email_values_count_as_missing() {
    let email = EmailSettings {
        resend_api_key: Some("   ".into()),
        contact_email: Some("owner@example.dev".into()),
        aws_region: Some("eu-west-1".into()),
        aws_ses_endpoint: Some("".into()),
        ..EmailSettings::default()
    };

    let resend = email.resend();
    assert!(resend.api_key.is_none());
    assert_eq!(resend.to.as_deref(), Some("owner@example.dev"));
    assert_eq!(email.ses().endpoint, "https://email.eu-west-1.amazonaws.com");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut config = AppConfig::default();
    config.email.resend_api_key = Some("re_live_secret".into());
    config.email.aws_secret_access_key = Some("wJalrXUtnFEMIEXAMPLE".into());

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("re_live_secret"));
    assert!(!rendered.contains("wJalrXUtnFEMIEXAMPLE"));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn cors_origins_split_comma_separated_entries() {
    let config = AppConfig {
        cors_allowed_origins: vec!["https://a.dev, https://b.dev".into(), " ".into()],
        ..AppConfig::default()
    };

    assert_eq!(config.cors_origins(), vec!["https://a.dev", "https://b.dev"]);
}
