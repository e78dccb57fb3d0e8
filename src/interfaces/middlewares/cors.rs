use actix_cors::Cors;

use crate::constants::{
    CSRF_HEADER, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
};

/// CORS policy for the contact API. The browser must be allowed to send the
/// CSRF header and read the rate-limit headers back.
pub fn build_cors(origins: &[String]) -> Cors {
    let cors = origins.iter().fold(Cors::default(), |cors, origin| {
        if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        }
    });

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec!["content-type", CSRF_HEADER])
        .expose_headers(vec![
            RATE_LIMIT_LIMIT_HEADER,
            RATE_LIMIT_REMAINING_HEADER,
            RATE_LIMIT_RESET_HEADER,
            "retry-after",
        ])
        .max_age(3600)
}
