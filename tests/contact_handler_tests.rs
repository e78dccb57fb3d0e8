
use actix_web::{http::StatusCode, test};
use mockall::predicate::function;
use portfolio_contact::{
    entities::email::{MessageId, RenderedEmail},
    errors::DispatchError,
    mailer::provider::EmailBackend,
    repositories::rate_limit::RateLimitStore,
};
use serde_json::{json, Value};
use test_utils::*;

fn accepting_provider(backend: EmailBackend, times: usize) -> MockProvider {
    let mut provider = configured_provider(backend);
    provider
        .expect_send()
        .times(times)
        .returning(|_| Ok(MessageId("msg-123".into())));
    provider
}

#[actix_rt::test]
async fn valid_submission_is_delivered_through_resend() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let mut resend = configured_provider(EmailBackend::Resend);
    resend
        .expect_send()
        .with(function(|email: &RenderedEmail| {
            email.subject == "New Contact Form Message from Jane Doe"
                && email.reply_to == "jane@example.com"
                && email.html.contains("+1 (555) 010-2030")
        }))
        .times(1)
        .returning(|_| Ok(MessageId("re_1".into())));
    let app = spawn_app(test_state(limiter, resend, idle_provider(EmailBackend::Ses))).await;

    let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("5"));
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("4"));
    assert_eq!(
        header(&resp, "x-ratelimit-reset"),
        Some((start_time() + chrono::Duration::minutes(15)).timestamp_millis().to_string().as_str())
    );
    assert_eq!(read_json(resp).await, json!({ "data": true, "error": "" }));
}

#[actix_rt::test]
async fn aws_endpoint_uses_ses_provider() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let mut ses = configured_provider(EmailBackend::Ses);
    ses.expect_send()
        .with(function(|email: &RenderedEmail| {
            email.subject == "[Portfolio Contact] Message from Jane Doe"
        }))
        .times(1)
        .returning(|_| Ok(MessageId("ses-1".into())));
    let app = spawn_app(test_state(limiter, idle_provider(EmailBackend::Resend), ses)).await;

    let req = contact_post("/api/sendEmailAWS", "203.0.113.7", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!({ "data": true, "error": "" }));
}

#[actix_rt::test]
async fn unconfigured_provider_fails_without_sending() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let mut resend = unconfigured_provider(EmailBackend::Resend);
    resend.expect_send().never();
    let app = spawn_app(test_state(limiter, resend, idle_provider(EmailBackend::Ses))).await;

    let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(resp).await,
        json!({
            "data": false,
            "error": "Email service is not configured. Please contact the administrator."
        })
    );
}

#[actix_rt::test]
async fn provider_failure_is_reported_generically() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let mut resend = configured_provider(EmailBackend::Resend);
    resend.expect_send().times(1).returning(|_| {
        Err(DispatchError::Rejected {
            status: 422,
            body: "invalid api key sk_live_secret".into(),
        })
    });
    let app = spawn_app(test_state(limiter, resend, idle_provider(EmailBackend::Ses))).await;

    let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(resp).await;
    assert_eq!(
        body,
        json!({ "data": false, "error": "Failed to send email. Please try again later." })
    );
    assert!(!body.to_string().contains("sk_live_secret"));
}

#[actix_rt::test]
async fn missing_csrf_token_is_forbidden_before_parsing() {
    let (limiter, _clock, store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/sendEmail")
        .insert_header(("x-forwarded-for", "203.0.113.7"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(header(&resp, "x-ratelimit-limit").is_none());
    assert_eq!(
        read_json(resp).await,
        json!({
            "data": null,
            "error": "Invalid CSRF token. Please refresh the page and try again."
        })
    );
    assert_eq!(store.len(), 0);
}

#[actix_rt::test]
async fn malformed_csrf_tokens_are_forbidden() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    for token in ["", "abc", "a.b.c", ".abc", "abc."] {
        let req = test::TestRequest::post()
            .uri("/api/sendEmailAWS")
            .insert_header(("x-csrf-token", token))
            .set_json(valid_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "token {token:?}");
    }
}

#[actix_rt::test]
async fn non_post_methods_are_rejected() {
    let (limiter, _clock, store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    for req in [
        test::TestRequest::get().uri("/api/sendEmail").to_request(),
        test::TestRequest::put().uri("/api/sendEmailAWS").to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            read_json(resp).await,
            json!({ "data": null, "error": "Method not allowed" })
        );
    }
    assert_eq!(store.len(), 0);
}

#[actix_rt::test]
async fn sixth_request_in_window_is_rate_limited() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        accepting_provider(EmailBackend::Resend, 5),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    for _ in 0..5 {
        let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("5"));
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("0"));
    assert_eq!(header(&resp, "retry-after"), Some("900"));
    assert_eq!(
        read_json(resp).await,
        json!({ "data": null, "error": "Too many requests. Please try again later." })
    );
}

#[actix_rt::test]
async fn both_endpoints_share_one_budget() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        accepting_provider(EmailBackend::Resend, 3),
        accepting_provider(EmailBackend::Ses, 2),
    ))
    .await;

    for path in ["/api/sendEmail", "/api/sendEmailAWS"].iter().cycle().take(5) {
        let req = contact_post(path, "198.51.100.9", &valid_body()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = contact_post("/api/sendEmailAWS", "198.51.100.9", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_rt::test]
async fn rate_limit_is_tracked_per_client() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        accepting_provider(EmailBackend::Resend, 6),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    for _ in 0..5 {
        let req = contact_post("/api/sendEmail", "203.0.113.7", &valid_body()).to_request();
        test::call_service(&app, req).await;
    }

    let req = contact_post("/api/sendEmail", "203.0.113.8", &valid_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("4"));
}

#[actix_rt::test]
async fn invalid_form_lists_every_error_and_counts_against_limit() {
    let (limiter, _clock, store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let body = json!({ "name": "A", "email": "not-an-email", "message": "short" });
    let req = contact_post("/api/sendEmail", "203.0.113.7", &body).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("4"));
    assert_eq!(
        read_json(resp).await,
        json!({
            "data": null,
            "error": "Validation failed: Name must be at least 2 characters, Invalid email format, Message must be at least 10 characters"
        })
    );
    assert_eq!(store.get("203.0.113.7").map(|e| e.count), Some(1));
}

#[actix_rt::test]
async fn malformed_json_is_a_validation_error() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/sendEmail")
        .insert_header(("x-csrf-token", VALID_CSRF_TOKEN))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(resp).await;
    assert_eq!(body["error"], "Validation failed: Request body must be a JSON object");
}

#[actix_rt::test]
async fn csrf_token_endpoint_issues_acceptable_tokens() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::get().uri("/api/csrf-token").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "cache-control"), Some("no-store"));
    let body = read_json(resp).await;
    let token = body["token"].as_str().unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|part| !part.is_empty()));
}

#[actix_rt::test]
async fn health_reports_backend_configuration() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        unconfigured_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["email_backends"],
        json!([
            { "backend": "resend", "configured": true },
            { "backend": "ses", "configured": false }
        ])
    );
    assert_eq!(body["rate_limited_clients"], 0);
}

fn oversized_payload() -> Vec<u8> {
    vec![b'a'; 300 * 1024]
}

#[actix_rt::test]
async fn oversized_body_without_token_is_still_forbidden() {
    let (limiter, _clock, store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/sendEmail")
        .insert_header(("content-type", "application/json"))
        .set_payload(oversized_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.len(), 0);
}

#[actix_rt::test]
async fn oversized_body_on_get_is_method_not_allowed() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::get()
        .uri("/api/sendEmailAWS")
        .set_payload(oversized_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_rt::test]
async fn oversized_body_with_token_is_a_validation_error() {
    let (limiter, _clock, _store) = test_limiter(test_policy());
    let app = spawn_app(test_state(
        limiter,
        idle_provider(EmailBackend::Resend),
        idle_provider(EmailBackend::Ses),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/sendEmail")
        .insert_header(("x-csrf-token", VALID_CSRF_TOKEN))
        .insert_header(("content-type", "application/json"))
        .set_payload(oversized_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("4"));
    assert_eq!(
        read_json(resp).await,
        json!({
            "data": null,
            "error": "Validation failed: Request body must not exceed 65536 bytes"
        })
    );
}
