//! Minimal AWS Signature Version 4 signer for JSON `POST` requests.
//!
//! Signs `content-type`, `host` and `x-amz-date`, which is all the SES v2
//! `SendEmail` call needs.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::errors::DispatchError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub struct SigV4Signer<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Header values to attach to the signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub authorization: String,
    pub amz_date: String,
    pub host: String,
}

impl SigV4Signer<'_> {
    pub fn sign_post(
        &self,
        url: &Url,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedRequest, DispatchError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let host = host_header(url)?;

        let canonical_uri = if url.path().is_empty() { "/" } else { url.path() };
        let canonical_query = url.query().unwrap_or("");
        let signed_headers = "content-type;host;x-amz-date";
        let canonical_headers =
            format!("content-type:{JSON_CONTENT_TYPE}\nhost:{host}\nx-amz-date:{amz_date}\n");

        let canonical_request = format!(
            "POST\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{}",
            sha256_hex(body)
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = self.signing_key(&date)?;
        let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes())?);

        Ok(SignedRequest {
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.access_key_id
            ),
            amz_date,
            host,
        })
    }

    fn signing_key(&self, date: &str) -> Result<Vec<u8>, DispatchError> {
        let secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac(&k_date, self.region.as_bytes())?;
        let k_service = hmac(&k_region, self.service.as_bytes())?;
        hmac(&k_service, b"aws4_request")
    }
}

fn host_header(url: &Url) -> Result<String, DispatchError> {
    let host = url
        .host_str()
        .ok_or_else(|| DispatchError::Signing(format!("endpoint has no host: {url}")))?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, DispatchError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| DispatchError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
