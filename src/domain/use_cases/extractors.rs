use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::utils::client_id::client_identifier;

/// Rate-limit key of the caller.
/// Usage: Add `client: ClientId` as a parameter to your handler function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl FromRequest for ClientId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(ClientId(client_identifier(req))))
    }
}
