use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;

use crate::mailer::provider::EmailBackend;

/// Rejections produced by the contact pipeline. The display strings are the
/// exact client-facing messages; provider details never reach them.
#[derive(Debug, Display)]
pub enum ContactError {
    #[display("Method not allowed")]
    MethodNotAllowed,

    #[display("Invalid CSRF token. Please refresh the page and try again.")]
    InvalidCsrfToken,

    #[display("Too many requests. Please try again later.")]
    RateLimited,

    #[display("Validation failed: {_0}")]
    Validation(FieldErrors),

    #[display("Email service is not configured. Please contact the administrator.")]
    NotConfigured,

    #[display("Failed to send email. Please try again later.")]
    DispatchFailed,
}

impl ContactError {
    /// Stable identifier for logs and dashboards.
    pub fn kind(&self) -> &'static str {
        match self {
            ContactError::MethodNotAllowed => "method_not_allowed",
            ContactError::InvalidCsrfToken => "invalid_csrf_token",
            ContactError::RateLimited => "rate_limited",
            ContactError::Validation(_) => "validation_failed",
            ContactError::NotConfigured => "email_not_configured",
            ContactError::DispatchFailed => "email_dispatch_failed",
        }
    }

    /// `data` is `null` for requests rejected before the mailer was
    /// consulted and `false` once a send was attempted or refused.
    fn data(&self) -> Option<bool> {
        match self {
            ContactError::NotConfigured | ContactError::DispatchFailed => Some(false),
            _ => None,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ContactResponse {
                data: self.data(),
                error: self.to_string(),
            })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::InvalidCsrfToken => StatusCode::FORBIDDEN,
            ContactError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::DispatchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body shared by every contact endpoint response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub data: Option<bool>,
    pub error: String,
}

impl ContactResponse {
    pub fn delivered() -> Self {
        ContactResponse {
            data: Some(true),
            error: String::new(),
        }
    }
}

/// Ordered validation messages, one per failed constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub Vec<String>);

impl FieldErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// A provider is missing settings it needs before it can send anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub backend: EmailBackend,
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required {} settings: {}", self.backend, self.missing.join(", "))
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Display)]
pub enum DispatchError {
    #[display("email provider is not configured: {_0}")]
    NotConfigured(ConfigurationError),

    #[display("transport error: {_0}")]
    Transport(String),

    #[display("provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[display("unexpected provider response: {_0}")]
    InvalidResponse(String),

    #[display("request signing failed: {_0}")]
    Signing(String),
}

impl std::error::Error for DispatchError {}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(err.to_string())
    }
}

impl From<ConfigurationError> for DispatchError {
    fn from(err: ConfigurationError) -> Self {
        DispatchError::NotConfigured(err)
    }
}
