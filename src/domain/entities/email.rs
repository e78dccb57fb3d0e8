use std::fmt;

use serde::Serialize;

/// Provider-assigned identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Both views of a contact notification, ready for any provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDispatchResult {
    pub success: bool,
    pub error: Option<String>,
}

impl EmailDispatchResult {
    pub fn delivered() -> Self {
        EmailDispatchResult {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        EmailDispatchResult {
            success: false,
            error: Some(message.into()),
        }
    }
}
