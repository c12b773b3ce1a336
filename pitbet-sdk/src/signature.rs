//! Signature algorithm and verification for the pitbet service API.
//!
//! The wire format for the header is:
//!
//! ```text
//! Pitbet-Signature: {unix_timestamp}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{timestamp}.{json_body}", secret)`.

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "Pitbet-Signature";

/// Header name for admin API authentication (plaintext secret).
pub const ADMIN_AUTH_HEADER: &str = "Pitbet-Admin-Authorization";

/// Maximum allowed age of a signature (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Maximum allowed clock skew into the future (in seconds).
pub const MAX_CLOCK_SKEW: i64 = 30;

/// Request bodies accepted by the service API.
pub trait Signature: for<'de> serde::Deserialize<'de> + serde::Serialize {}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid header format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A service API body together with what authenticates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedObject<T: Signature> {
    pub body: T,
    pub timestamp: i64,
    pub json: String,
    pub signature: Box<[u8]>,
}

impl<T: Signature> SignedObject<T> {
    /// Serialize and sign `body` with the current time.
    pub fn new(body: T, key: &[u8]) -> Result<Self, serde_json::Error> {
        Self::new_at(body, key, unix_now())
    }

    pub fn new_at(body: T, key: &[u8], timestamp: i64) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(&body)?;
        let tag = ring::hmac::sign(&hmac_key(key), signing_input(timestamp, &json).as_bytes());
        Ok(Self {
            body,
            timestamp,
            json,
            signature: Box::from(tag.as_ref()),
        })
    }

    /// Pair a received header with the raw body. The body must be the exact
    /// bytes that were signed, so it is kept alongside the parsed value.
    ///
    /// Nothing is authenticated until [`verify`](Self::verify).
    pub fn from_header_and_body(
        header_value: &str,
        body_json: String,
    ) -> Result<Self, SignatureError> {
        let (timestamp, signature) = parse_signature_header(header_value)?;
        let body: T = serde_json::from_str(&body_json)?;
        Ok(Self {
            body,
            timestamp,
            json: body_json,
            signature,
        })
    }

    /// Check freshness and the HMAC, then hand out the payload.
    pub fn verify(self, key: &[u8]) -> Result<T, SignatureError> {
        self.verify_at(key, unix_now())
    }

    /// [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at(self, key: &[u8], now: i64) -> Result<T, SignatureError> {
        check_timestamp_at(self.timestamp, now)?;
        ring::hmac::verify(
            &hmac_key(key),
            signing_input(self.timestamp, &self.json).as_bytes(),
            &self.signature,
        )?;
        Ok(self.body)
    }

    pub fn to_header(&self) -> String {
        format_signature_header(self.timestamp, &self.signature)
    }
}

fn hmac_key(secret: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret)
}

fn signing_input(timestamp: i64, json: &str) -> String {
    format!("{timestamp}.{json}")
}

fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Split a `{timestamp}.{base64}` header value.
pub fn parse_signature_header(value: &str) -> Result<(i64, Box<[u8]>), SignatureError> {
    let (timestamp, encoded) = value.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp = timestamp
        .parse::<i64>()
        .map_err(|_| SignatureError::InvalidFormat)?;
    let signature = fast32::base64::RFC4648_NOPAD
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?;
    Ok((timestamp, signature.into_boxed_slice()))
}

pub fn format_signature_header(timestamp: i64, signature: &[u8]) -> String {
    let encoded = fast32::base64::RFC4648_NOPAD.encode(signature);
    format!("{timestamp}.{encoded}")
}

/// Accepts timestamps up to [`MAX_SIGNATURE_AGE`] old and at most
/// [`MAX_CLOCK_SKEW`] ahead of `now`.
pub fn check_timestamp_at(timestamp: i64, now: i64) -> Result<(), SignatureError> {
    let age = now.saturating_sub(timestamp);
    if age > MAX_SIGNATURE_AGE || -age > MAX_CLOCK_SKEW {
        return Err(SignatureError::Expired);
    }
    Ok(())
}
