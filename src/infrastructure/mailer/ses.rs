use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde::{Deserialize, Serialize};

use crate::{
    entities::email::{MessageId, RenderedEmail},
    errors::{ConfigurationError, DispatchError},
    settings::SesSettings,
};

use super::{
    provider::{require, EmailBackend, EmailProvider},
    sigv4::{SigV4Signer, JSON_CONTENT_TYPE},
};

const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";
const SIGNING_SERVICE: &str = "ses";
const CHARSET: &str = "UTF-8";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from_email_address: &'a str,
    destination: Destination<'a>,
    reply_to_addresses: [&'a str; 1],
    content: EmailContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmailContent<'a> {
    simple: SimpleMessage<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleMessage<'a> {
    subject: Content<'a>,
    body: Body<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Body<'a> {
    html: Content<'a>,
    text: Content<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content<'a> {
    data: &'a str,
    charset: &'static str,
}

impl<'a> Content<'a> {
    fn utf8(data: &'a str) -> Self {
        Content { data, charset: CHARSET }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: String,
}

struct SesCredentials<'a> {
    access_key_id: &'a str,
    secret_access_key: &'a str,
    from: &'a str,
    to: &'a str,
}

/// Sends through the Amazon SES v2 API with SigV4-signed requests.
#[derive(Clone)]
pub struct SesProvider {
    client: Client,
    settings: SesSettings,
}

impl SesProvider {
    pub fn new(client: Client, settings: SesSettings) -> Self {
        SesProvider { client, settings }
    }

    fn credentials(&self) -> Result<SesCredentials<'_>, ConfigurationError> {
        let mut missing = Vec::new();
        let access_key_id = require(
            self.settings.access_key_id.as_deref(),
            "AWS_ACCESS_KEY_ID",
            &mut missing,
        );
        let secret_access_key = require(
            self.settings.secret_access_key.as_ref().map(|key| key.as_str()),
            "AWS_SECRET_ACCESS_KEY",
            &mut missing,
        );
        let from = require(self.settings.from.as_deref(), "AWS_SES_FROM_EMAIL", &mut missing);
        let to = require(self.settings.to.as_deref(), "AWS_SES_TO_EMAIL", &mut missing);

        match (access_key_id, secret_access_key, from, to) {
            (Some(access_key_id), Some(secret_access_key), Some(from), Some(to)) => {
                Ok(SesCredentials { access_key_id, secret_access_key, from, to })
            }
            _ => Err(ConfigurationError {
                backend: EmailBackend::Ses,
                missing,
            }),
        }
    }

    fn send_email_url(&self) -> Result<Url, DispatchError> {
        let endpoint = self.settings.endpoint.trim_end_matches('/');
        Url::parse(&format!("{endpoint}{SEND_EMAIL_PATH}"))
            .map_err(|e| DispatchError::Transport(format!("invalid SES endpoint {endpoint}: {e}")))
    }
}

#[async_trait]
impl EmailProvider for SesProvider {
    fn backend(&self) -> EmailBackend {
        EmailBackend::Ses
    }

    fn ensure_configured(&self) -> Result<(), ConfigurationError> {
        self.credentials().map(|_| ())
    }

    async fn send(&self, email: &RenderedEmail) -> Result<MessageId, DispatchError> {
        let credentials = self.credentials()?;
        let url = self.send_email_url()?;

        let payload = SendEmailRequest {
            from_email_address: credentials.from,
            destination: Destination {
                to_addresses: [credentials.to],
            },
            reply_to_addresses: [email.reply_to.as_str()],
            content: EmailContent {
                simple: SimpleMessage {
                    subject: Content::utf8(&email.subject),
                    body: Body {
                        html: Content::utf8(&email.html),
                        text: Content::utf8(&email.text),
                    },
                },
            },
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| DispatchError::InvalidResponse(format!("could not encode request: {e}")))?;

        let signer = SigV4Signer {
            access_key_id: credentials.access_key_id,
            secret_access_key: credentials.secret_access_key,
            region: &self.settings.region,
            service: SIGNING_SERVICE,
        };
        let signed = signer.sign_post(&url, &body, Utc::now())?;

        let response = self.client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-amz-date", signed.amz_date)
            .header("authorization", signed.authorization)
            .body(body)
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

        Ok(MessageId(accepted.message_id))
    }
}
