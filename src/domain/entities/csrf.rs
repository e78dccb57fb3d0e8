use std::fmt;

use serde::Serialize;

/// `<base36 timestamp>.<base36 random>`. Only the shape is ever checked;
/// the token is not bound to a session or signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(timestamp: &str, random: &str) -> Self {
        CsrfToken(format!("{timestamp}.{random}"))
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: CsrfToken,
}
