//! Decoding of compact `header.payload.signature` tokens
//!
//! The [`Decoder`] trait is the seam through which a validation context
//! obtains a [`DecodedToken`]. [`CompactDecoder`] is the default adapter.
//! Decoding checks structure only: no signature is verified and no claim is
//! interpreted here.

use crate::error::{Error, Result};
use crate::header::TokenHeader;
use crate::limits::{DecodeLimits, MAX_ALG_LENGTH, MAX_KID_LENGTH};
use crate::utils::base64url;
use crate::utils::bounds::validate_field_size;

/// A token split into its parts, signature not yet verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    header: TokenHeader,
    signing_input: String,
    signature: Vec<u8>,
    payload: String,
}

impl DecodedToken {
    pub fn new(
        header: TokenHeader,
        signing_input: impl Into<String>,
        signature: Vec<u8>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            header,
            signing_input: signing_input.into(),
            signature,
            payload: payload.into(),
        }
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// The bytes the signature covers (`header.payload` as transmitted)
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Raw claims JSON. Not trustworthy until the signature is verified!
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Turns a raw token string into a [`DecodedToken`]
pub trait Decoder {
    fn decode(&self, token: &str) -> Result<DecodedToken>;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(&self, token: &str) -> Result<DecodedToken> {
        (**self).decode(token)
    }
}

/// Decoder for compact JWS serialization with configurable size limits
#[derive(Debug, Clone, Default)]
pub struct CompactDecoder {
    limits: DecodeLimits,
}

impl CompactDecoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom limits
    pub fn with_limits(limits: DecodeLimits) -> Self {
        Self { limits }
    }
}

impl Decoder for CompactDecoder {
    fn decode(&self, token: &str) -> Result<DecodedToken> {
        if token.len() > self.limits.max_token_length {
            return Err(Error::TokenTooLarge {
                size: token.len(),
                max: self.limits.max_token_length,
            });
        }

        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        let payload_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        let signature_b64 = parts.next().ok_or(Error::FormatInvalid)?;
        if parts.next().is_some() || header_b64.is_empty() || payload_b64.is_empty() {
            return Err(Error::FormatInvalid);
        }

        let header_json = base64url::decode_string(header_b64, self.limits.max_header_size)?;
        let header: TokenHeader = miniserde::json::from_str(&header_json)
            .map_err(|e| Error::FormatInvalidJson(format!("Failed to parse header: {e}")))?;

        validate_field_size("alg", &header.algorithm, MAX_ALG_LENGTH)?;
        if let Some(kid) = &header.key_id {
            validate_field_size("kid", kid, MAX_KID_LENGTH)?;
        }

        let payload = base64url::decode_string(payload_b64, self.limits.max_payload_size)?;
        let signature = base64url::decode_bytes(signature_b64, self.limits.max_signature_size)?;

        Ok(DecodedToken {
            header,
            signing_input: format!("{header_b64}.{payload_b64}"),
            signature,
            payload,
        })
    }
}
