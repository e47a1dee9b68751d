//! Slack request signing (`v0` scheme).
//!
//! Slack signs `v0:{timestamp}:{raw body}` with HMAC-SHA256 using the app's
//! signing secret and sends the hex digest as `X-Slack-Signature: v0=<hex>`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const MAX_REQUEST_AGE_SECS: u64 = 300;

const SIGNATURE_VERSION: &str = "v0";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing `{TIMESTAMP_HEADER}` header")]
    MissingTimestamp,
    #[error("invalid request timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("request timestamp is {age_secs}s away from server time")]
    StaleTimestamp { age_secs: u64 },
    #[error("missing `{SIGNATURE_HEADER}` header")]
    MissingSignature,
    #[error("malformed request signature")]
    MalformedSignature,
    #[error("request signature does not match")]
    Mismatch,
    #[error("signing key rejected: {0}")]
    Key(String),
}

#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    secret: SecretString,
    max_age_secs: u64,
}

impl SignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret, max_age_secs: MAX_REQUEST_AGE_SECS }
    }

    /// Checks a request against the signing secret. `now_unix` is the current
    /// time in seconds since the epoch.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now_unix: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.map(str::trim).ok_or(SignatureError::MissingTimestamp)?;
        let issued_at = timestamp
            .parse::<i64>()
            .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_owned()))?;
        let age_secs = now_unix.abs_diff(issued_at);
        if age_secs > self.max_age_secs {
            return Err(SignatureError::StaleTimestamp { age_secs });
        }

        let signature = signature.map(str::trim).ok_or(SignatureError::MissingSignature)?;
        let digest = signature
            .strip_prefix(SIGNATURE_VERSION)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or(SignatureError::MalformedSignature)?;
        let expected = hex::decode(digest).map_err(|_| SignatureError::MalformedSignature)?;

        self.mac(timestamp, body)?.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)
    }

    /// Produces the `X-Slack-Signature` value for a request.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let digest = self.mac(timestamp, body)?.finalize().into_bytes();
        Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|error| SignatureError::Key(error.to_string()))?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }
}
