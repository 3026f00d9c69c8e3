//! Errors for tokenverdict
//!
//! Two layers live here. [`Error`] is what collaborators (decoder, signature
//! verifier, directories) report. [`ValidationError`] is what a validation
//! context accumulates: a kind tag, a human-readable message and, when a
//! collaborator was involved, the underlying [`Error`] as its cause.

use std::fmt;
use thiserror::Error;

/// Collaborator and wire-format errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Invalid token format: expected three parts separated by '.'")]
    FormatInvalid,

    #[error("Base64URL decoding failed: {0}")]
    FormatInvalidBase64(String),

    #[error("JSON parsing failed: {0}")]
    FormatInvalidJson(String),

    #[error("Header field '{field}' too long: {length} bytes (maximum: {max} bytes)")]
    HeaderFieldTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    // ============================================================================
    // Algorithm Errors
    // ============================================================================
    #[error("Algorithm '{0}' is not supported")]
    AlgorithmUnsupported(String),

    #[error("The 'none' algorithm is rejected for security reasons (RFC 8725)")]
    AlgorithmNoneRejected,

    #[error("Algorithm mismatch: verifier expects '{expected}', token uses '{found}'")]
    AlgorithmMismatch { expected: String, found: String },

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Invalid verification key: {0}")]
    KeyInvalid(String),

    // ============================================================================
    // Directory Errors
    // ============================================================================
    #[error("No user with id '{0}'")]
    UserNotFound(String),

    #[error("No client with id '{0}'")]
    ClientNotFound(String),

    #[error("Directory lookup failed: {0}")]
    Directory(String),
}

/// Result type alias for collaborator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind tag of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The token could not be decoded or its claims could not be read
    DecodeError,
    /// The signature did not verify
    SignatureError,
    /// A required claim is absent
    MissingClaim,
    /// A claim is present but has the wrong shape
    MalformedClaim,
    /// The token is past its `exp`
    ExpiredToken,
    /// The `iss` claim names another issuer
    InvalidIssuer,
    /// The token lacks scopes the caller requires
    InsufficientScope,
    /// The token carries scopes its user or client no longer has
    RevokedScope,
    /// The token (or the whole account) has been revoked
    RevokedToken,
    /// The `user_id` claim refers to no known user
    UnknownUser,
    /// The `cid` claim refers to no known client
    UnknownClient,
    /// Expected parties are missing from the `aud` claim
    AudienceMismatch,
}

impl ErrorKind {
    /// Stable tag for logs and diagnostics
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DecodeError => "decode_error",
            ErrorKind::SignatureError => "signature_error",
            ErrorKind::MissingClaim => "missing_claim",
            ErrorKind::MalformedClaim => "malformed_claim",
            ErrorKind::ExpiredToken => "expired_token",
            ErrorKind::InvalidIssuer => "invalid_issuer",
            ErrorKind::InsufficientScope => "insufficient_scope",
            ErrorKind::RevokedScope => "revoked_scope",
            ErrorKind::RevokedToken => "revoked_token",
            ErrorKind::UnknownUser => "unknown_user",
            ErrorKind::UnknownClient => "unknown_client",
            ErrorKind::AudienceMismatch => "audience_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a token failed validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<Error>,
}

impl ValidationError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn with_cause(kind: ErrorKind, message: impl Into<String>, cause: Error) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// What class of failure this is
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Collaborator error that triggered this failure, if any
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_ref()
    }
}
