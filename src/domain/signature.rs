//! Keyed MD5 signatures over canonical parameter strings.
//!
//! The gateway mandates `MD5(canonical + "&key=" + key)` rendered as uppercase
//! hex, for requests, responses and notifications alike. The algorithm is an
//! interoperability constraint and must not be swapped for a stronger hash.

use super::canonical::canonical_string;
use super::params::ParameterSet;
use crate::error::SignatureError;
use serde::Deserialize;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Name of the field carrying the signature on every signed message.
pub const SIGN_FIELD: &str = "sign";

/// Merchant signing key. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Signs outgoing parameter sets and verifies incoming ones.
#[derive(Debug, Clone)]
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Computes the signature over every entry of `params`.
    pub fn sign(&self, params: &ParameterSet) -> String {
        let raw = format!("{}&key={}", canonical_string(params), self.key.expose());
        format!("{:X}", md5::compute(raw.as_bytes()))
    }

    /// Verifies the `sign` field against the rest of the message.
    pub fn verify(&self, params: &ParameterSet) -> Result<(), SignatureError> {
        self.verify_with(params, SIGN_FIELD, false)
    }

    /// Verifies a signature stored under `field`.
    ///
    /// With `keep_field` the signature entry stays part of the signed input,
    /// which some gateway endpoints expect.
    pub fn verify_with(
        &self,
        params: &ParameterSet,
        field: &str,
        keep_field: bool,
    ) -> Result<(), SignatureError> {
        let provided = match params.get(field) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => {
                warn!(field, "signed message carries no signature");
                return Err(SignatureError::Missing(field.to_string()));
            }
        };

        let mut unsigned = params.clone();
        if !keep_field {
            unsigned.remove(field);
        }
        let expected = self.sign(&unsigned);

        if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            Ok(())
        } else {
            warn!("signature mismatch");
            Err(SignatureError::Mismatch)
        }
    }

    pub fn is_valid(&self, params: &ParameterSet) -> bool {
        self.verify(params).is_ok()
    }
}
