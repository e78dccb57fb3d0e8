use actix_web::HttpRequest;
use chrono::Utc;
use rand::Rng;

use crate::{constants::CSRF_HEADER, entities::csrf::CsrfToken};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Issues a token from the current time and a random fragment.
/// Tokens are not guaranteed unique and are not used as keys.
pub fn issue_csrf_token() -> CsrfToken {
    let timestamp = Utc::now().timestamp_millis().max(0) as u64;
    let random: u64 = rand::thread_rng().gen_range(1..u64::MAX);

    CsrfToken::new(&to_base36(timestamp), &to_base36(random))
}

/// Structural check only: exactly two non-empty, dot-separated parts.
pub fn validate_csrf_token(token: Option<&str>) -> bool {
    let Some(token) = token else {
        return false;
    };

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(timestamp), Some(random), None) => !timestamp.is_empty() && !random.is_empty(),
        _ => false,
    }
}

pub fn csrf_token_from_request(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}
