use actix_web::{
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
    web, HttpRequest, HttpResponse,
};
use futures_util::StreamExt;

use crate::{
    auth::csrf::csrf_token_from_request,
    constants::{
        MAX_CONTACT_BODY_BYTES, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
        RATE_LIMIT_RESET_HEADER,
    },
    entities::rate_limit::RateLimitDecision,
    errors::{ContactResponse, FieldErrors},
    use_cases::{
        contact::{ContactHandler, ContactOutcome, ContactRequest},
        extractors::ClientId,
    },
    AppState,
};

/// Contact form endpoint delivering through Resend.
pub async fn send_email(
    req: HttpRequest,
    client: ClientId,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    submit(&state.resend_contact, &req, &client, payload).await
}

/// Contact form endpoint delivering through Amazon SES.
pub async fn send_email_aws(
    req: HttpRequest,
    client: ClientId,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    submit(&state.ses_contact, &req, &client, payload).await
}

async fn submit(
    handler: &ContactHandler,
    req: &HttpRequest,
    client: &ClientId,
    payload: web::Payload,
) -> HttpResponse {
    let request = ContactRequest {
        method: req.method(),
        csrf_token: csrf_token_from_request(req),
        client_id: &client.0,
    };
    let outcome = handler
        .process(request, read_body(payload, MAX_CONTACT_BODY_BYTES))
        .await;

    into_response(outcome)
}

/// Buffers the request body, giving up once it grows past `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::Bytes, FieldErrors> {
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!("Failed to read contact request body: {}", e);
            body_error("Request body could not be read")
        })?;

        if body.len() + chunk.len() > limit {
            return Err(body_error(&format!("Request body must not exceed {limit} bytes")));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

fn body_error(message: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.push(message);
    errors
}

fn into_response(outcome: ContactOutcome) -> HttpResponse {
    let mut response = match outcome.result {
        Ok(()) => HttpResponse::Ok().json(ContactResponse::delivered()),
        Err(e) => {
            tracing::warn!(kind = e.kind(), "Contact submission rejected: {}", e);
            e.to_http_response()
        }
    };

    if let Some(decision) = outcome.rate_limit {
        insert_rate_limit_headers(response.headers_mut(), &decision);
    }

    response
}

pub fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_LIMIT_HEADER),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_RESET_HEADER),
        HeaderValue::from(decision.reset_millis()),
    );

    if let Some(retry_after) = decision.retry_after_secs {
        headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    }
}
