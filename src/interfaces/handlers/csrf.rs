use actix_web::{HttpResponse, Responder};

use crate::{auth::csrf::issue_csrf_token, entities::csrf::CsrfTokenResponse};

/// Hands out a token in the format the contact endpoints expect in
/// `X-CSRF-Token`.
pub async fn issue_token() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(CsrfTokenResponse {
            token: issue_csrf_token(),
        })
}
