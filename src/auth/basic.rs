use axum::http::{header, HeaderMap};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use crate::error::AppError;

use super::NotificationCredentials;

/// Decoding config that accepts tokens with or without `=` padding.
const LENIENT_DECODE: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_DECODE);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_DECODE);

/// Credentials decoded from an `Authorization: Basic ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Decode `<scheme> <base64(username:password)>`.
    ///
    /// Only the first space and the first colon are significant, so
    /// passwords may themselves contain colons. The scheme word is not
    /// inspected. The token may be unpadded, use the URL-safe alphabet, or
    /// carry surrounding whitespace.
    pub fn from_header(value: &str) -> Result<Self, AppError> {
        let (_scheme, token) = value.split_once(' ').ok_or_else(|| {
            AppError::Unauthenticated("Authorization header has no credential token".into())
        })?;
        let token = token.trim();

        let decoded = STANDARD_LENIENT
            .decode(token)
            .or_else(|_| URL_SAFE_LENIENT.decode(token))
            .map_err(|e| AppError::Unauthenticated(format!("Invalid base64 credentials: {}", e)))?;

        let decoded = String::from_utf8(decoded)
            .map_err(|_| AppError::Unauthenticated("Credentials are not valid UTF-8".into()))?;

        let (username, password) = decoded.split_once(':').ok_or_else(|| {
            AppError::Unauthenticated("Credentials are missing the ':' separator".into())
        })?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Gatekeeper for the notification endpoint.
pub struct BasicAuthenticator {
    expected: NotificationCredentials,
}

impl BasicAuthenticator {
    pub fn new(expected: NotificationCredentials) -> Self {
        Self { expected }
    }

    /// Check the request headers against the configured credentials.
    ///
    /// Missing or undecodable credentials yield `Unauthenticated`; a
    /// well-formed pair that does not match yields `Forbidden`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?
            .to_str()
            .map_err(|_| {
                AppError::Unauthenticated("Authorization header is not valid ASCII".into())
            })?;

        let supplied = BasicCredentials::from_header(value)?;

        // Evaluate both comparisons so a username mismatch takes as long as a password mismatch
        let username_ok = constant_time_eq(
            supplied.username.as_bytes(),
            self.expected.username().as_bytes(),
        );
        let password_ok = constant_time_eq(
            supplied.password.as_bytes(),
            self.expected.password().as_bytes(),
        );

        if username_ok & password_ok {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
