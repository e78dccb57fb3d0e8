use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    entities::email::{MessageId, RenderedEmail},
    errors::{ConfigurationError, DispatchError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    Resend,
    Ses,
}

impl fmt::Display for EmailBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmailBackend::Resend => "resend",
            EmailBackend::Ses => "ses",
        };
        write!(f, "{s}")
    }
}

impl EmailBackend {
    /// Subject line each backend uses for a contact notification.
    pub fn subject_line(&self, name: &str) -> String {
        match self {
            EmailBackend::Resend => format!("New Contact Form Message from {name}"),
            EmailBackend::Ses => format!("[Portfolio Contact] Message from {name}"),
        }
    }
}

/// Outbound email capability. Each provider knows its own sender,
/// recipient and credentials; the contact pipeline only hands it a
/// rendered message.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn backend(&self) -> EmailBackend;

    /// Fails when any setting the provider needs is absent.
    fn ensure_configured(&self) -> Result<(), ConfigurationError>;

    async fn send(&self, email: &RenderedEmail) -> Result<MessageId, DispatchError>;
}

pub(crate) fn require<'a, T: ?Sized>(
    value: Option<&'a T>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}
