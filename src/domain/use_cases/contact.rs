use std::{future::Future, sync::Arc};

use actix_web::{http::Method, web::Bytes};

use crate::{
    auth::csrf::validate_csrf_token,
    entities::{
        contact::{ContactForm, ContactSubmission},
        email::EmailDispatchResult,
        rate_limit::RateLimitDecision,
    },
    errors::{ContactError, FieldErrors},
    limiter::rate_limiter::RateLimiter,
    mailer::{provider::EmailProvider, templates::render_contact_email},
};

/// Request metadata the pipeline checks before it touches the body.
#[derive(Debug, Clone, Copy)]
pub struct ContactRequest<'a> {
    pub method: &'a Method,
    pub csrf_token: Option<&'a str>,
    pub client_id: &'a str,
}

/// Result of a pipeline run. `rate_limit` is set once the limiter has seen
/// the request, whatever happened afterwards.
#[derive(Debug)]
pub struct ContactOutcome {
    pub rate_limit: Option<RateLimitDecision>,
    pub result: Result<(), ContactError>,
}

impl ContactOutcome {
    fn rejected(rate_limit: Option<RateLimitDecision>, error: ContactError) -> Self {
        ContactOutcome {
            rate_limit,
            result: Err(error),
        }
    }
}

/// Contact pipeline bound to one email provider.
#[derive(Clone)]
pub struct ContactHandler {
    pub limiter: Arc<RateLimiter>,
    pub provider: Arc<dyn EmailProvider>,
    site_name: String,
}

impl ContactHandler {
    pub fn new(
        limiter: Arc<RateLimiter>,
        provider: Arc<dyn EmailProvider>,
        site_name: impl Into<String>,
    ) -> Self {
        ContactHandler {
            limiter,
            provider,
            site_name: site_name.into(),
        }
    }

    /// Runs method, CSRF, rate-limit, validation, configuration and
    /// dispatch stages in that order, stopping at the first failure.
    /// `body` is only awaited once the first three stages have passed.
    pub async fn process<B>(&self, request: ContactRequest<'_>, body: B) -> ContactOutcome
    where
        B: Future<Output = Result<Bytes, FieldErrors>>,
    {
        if *request.method != Method::POST {
            return ContactOutcome::rejected(None, ContactError::MethodNotAllowed);
        }

        if !validate_csrf_token(request.csrf_token) {
            tracing::warn!(client_id = request.client_id, "Rejected submission with invalid CSRF token");
            return ContactOutcome::rejected(None, ContactError::InvalidCsrfToken);
        }

        let decision = self.limiter.check(request.client_id);
        if decision.limited {
            return ContactOutcome::rejected(Some(decision), ContactError::RateLimited);
        }

        let submission = match body.await.and_then(|body| ContactForm::parse(&body)) {
            Ok(submission) => submission,
            Err(errors) => {
                tracing::info!(client_id = request.client_id, errors = %errors, "Contact form failed validation");
                return ContactOutcome::rejected(Some(decision), ContactError::Validation(errors));
            }
        };

        if let Err(e) = self.provider.ensure_configured() {
            tracing::error!(backend = %self.provider.backend(), "Email service misconfigured: {}", e);
            return ContactOutcome::rejected(Some(decision), ContactError::NotConfigured);
        }

        let dispatch = self.send(&submission).await;

        ContactOutcome {
            rate_limit: Some(decision),
            result: if dispatch.success {
                Ok(())
            } else {
                Err(ContactError::DispatchFailed)
            },
        }
    }

    /// Renders the notification and hands it to the provider. Provider
    /// details are logged; the result only carries the client-facing text.
    pub async fn send(&self, submission: &ContactSubmission) -> EmailDispatchResult {
        let backend = self.provider.backend();

        if let Err(e) = self.provider.ensure_configured() {
            tracing::error!(%backend, "Email service misconfigured: {}", e);
            return EmailDispatchResult::failed(ContactError::NotConfigured.to_string());
        }

        let email = render_contact_email(submission, &self.site_name, backend);

        match self.provider.send(&email).await {
            Ok(message_id) => {
                tracing::info!(%backend, %message_id, "Contact email sent");
                EmailDispatchResult::delivered()
            }
            Err(e) => {
                tracing::error!(%backend, "Failed to send contact email: {}", e);
                EmailDispatchResult::failed(ContactError::DispatchFailed.to_string())
            }
        }
    }
}
