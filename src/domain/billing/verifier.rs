//! Webhook signature verification.
//!
//! Authenticates incoming webhook requests with HMAC-SHA256 over the exact
//! raw request body, using the provider's `t=<ts>,v1=<sig>` header scheme.
//! Each integration path holds its own verifier with its own secret.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::BillingError;
use super::provider_event::ProviderEvent;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook event before it is rejected as a replay.
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Tolerated clock skew for timestamps slightly in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed form of the provider's signature header.
#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    v1_signature: String,
}

impl SignatureHeader {
    /// Parses `t=<unix_ts>,v1=<hex_sig>[,v1=...]`. The first v1 entry wins.
    fn parse(header: &str) -> Result<Self, BillingError> {
        let mut timestamp = None;
        let mut v1_signature = None;

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        BillingError::ParseError("invalid timestamp in signature header".into())
                    })?);
                }
                Some(("v1", value)) if v1_signature.is_none() => {
                    v1_signature = Some(value.to_string());
                }
                _ => {} // unknown scheme entries are ignored
            }
        }

        match (timestamp, v1_signature) {
            (Some(timestamp), Some(v1_signature)) => Ok(Self {
                timestamp,
                v1_signature,
            }),
            _ => Err(BillingError::ParseError(
                "signature header missing t= or v1= component".into(),
            )),
        }
    }
}

/// Verifies webhook authenticity and freshness, then parses the payload.
///
/// Fails closed: a verifier constructed without a secret rejects every
/// request.
pub struct WebhookVerifier {
    secret: Option<SecretString>,
}

impl WebhookVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Authenticates the raw payload against the signature header and
    /// parses it into a [`ProviderEvent`].
    ///
    /// Verification happens on the exact bytes received, before any JSON
    /// parsing. The signed timestamp is checked against the replay window
    /// with a small allowance for clock skew.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<ProviderEvent, BillingError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or(BillingError::SecretNotConfigured)?;
        let header = signature_header.ok_or(BillingError::MissingSignature)?;
        let parsed = SignatureHeader::parse(header)?;

        self.check_timestamp(parsed.timestamp)?;

        let expected = compute_signature(secret, parsed.timestamp, payload);
        let provided = hex::decode(&parsed.v1_signature)
            .map_err(|_| BillingError::InvalidSignature)?;

        if expected.ct_eq(&provided).unwrap_u8() != 1 {
            return Err(BillingError::InvalidSignature);
        }

        serde_json::from_slice(payload)
            .map_err(|e| BillingError::ParseError(format!("invalid event payload: {e}")))
    }

    fn check_timestamp(&self, timestamp: i64) -> Result<(), BillingError> {
        let now = chrono::Utc::now().timestamp();
        if now - timestamp > MAX_EVENT_AGE_SECS {
            return Err(BillingError::TimestampOutOfRange);
        }
        if timestamp - now > MAX_CLOCK_SKEW_SECS {
            return Err(BillingError::TimestampOutOfRange);
        }
        Ok(())
    }
}

fn compute_signature(secret: &SecretString, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Builds a valid signature header for a payload. Used by tests and local
/// tooling to forge provider deliveries.
pub fn sign_payload(secret: &SecretString, timestamp: i64, payload: &[u8]) -> String {
    let signature = compute_signature(secret, timestamp, payload);
    format!("t={},v1={}", timestamp, hex::encode(signature))
}
