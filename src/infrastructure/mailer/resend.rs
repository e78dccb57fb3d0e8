use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    entities::email::{MessageId, RenderedEmail},
    errors::{ConfigurationError, DispatchError},
    settings::ResendSettings,
};

use super::provider::{require, EmailBackend, EmailProvider};

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Sends through Resend's HTTP API.
#[derive(Clone)]
pub struct ResendProvider {
    client: Client,
    settings: ResendSettings,
}

impl ResendProvider {
    pub fn new(client: Client, settings: ResendSettings) -> Self {
        ResendProvider { client, settings }
    }

    fn credentials(&self) -> Result<(&str, &str), ConfigurationError> {
        let mut missing = Vec::new();
        let api_key = require(
            self.settings.api_key.as_ref().map(|key| key.as_str()),
            "RESEND_API_KEY",
            &mut missing,
        );
        let to = require(self.settings.to.as_deref(), "CONTACT_EMAIL", &mut missing);

        match (api_key, to) {
            (Some(api_key), Some(to)) => Ok((api_key, to)),
            _ => Err(ConfigurationError {
                backend: EmailBackend::Resend,
                missing,
            }),
        }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.settings.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn backend(&self) -> EmailBackend {
        EmailBackend::Resend
    }

    fn ensure_configured(&self) -> Result<(), ConfigurationError> {
        self.credentials().map(|_| ())
    }

    async fn send(&self, email: &RenderedEmail) -> Result<MessageId, DispatchError> {
        let (api_key, to) = self.credentials()?;

        let payload = SendEmailRequest {
            from: &self.settings.from,
            to: [to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
            reply_to: &email.reply_to,
        };

        let response = self.client
            .post(self.emails_url())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let accepted: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::InvalidResponse(e.to_string()))?;

        Ok(MessageId(accepted.id))
    }
}
