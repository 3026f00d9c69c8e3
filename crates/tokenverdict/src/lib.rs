//! Aggregate validation of bearer token claims.
//!
//! A [`TokenValidation`] decodes a presented token once and then runs any
//! combination of checks against it: signature, issuer, expiry, audience,
//! user, client, scopes, revocation. Checks do not short-circuit. The final
//! [`Verdict`] carries every reason the token failed, in the order the checks
//! ran, so callers can both decide access and log a complete audit trail.
//!
//! ```ignore
//! use tokenverdict::*;
//!
//! let verifier = KeyVerifier::hmac(AlgorithmType::HS256, b"secret")?;
//! let mut validation = TokenValidation::validate(token);
//! validation
//!     .check_signature(&verifier)
//!     .check_issuer("https://uaa.example.com/oauth/token")
//!     .check_expiry_now()
//!     .check_client(&clients)
//!     .check_revocation_hash(&current_hash);
//!
//! if !validation.is_valid() {
//!     for error in validation.errors() {
//!         tracing::info!(kind = %error.kind(), "{error}");
//!     }
//! }
//! ```
//!
//! Decoding, signature verification and directory lookups are pluggable
//! through the [`Decoder`], [`SignatureVerifier`], [`UserDirectory`] and
//! [`ClientRegistry`] traits.

mod error;

// Internal modules
pub(crate) mod algorithm;
pub(crate) mod claims;
pub(crate) mod decode;
pub(crate) mod directory;
pub(crate) mod header;
pub(crate) mod limits;
pub(crate) mod scope;
pub(crate) mod utils;
pub(crate) mod validation;
pub(crate) mod verdict;

// Public Interface
pub use algorithm::{AlgorithmType, KeyVerifier, SignatureVerifier};
pub use claims::{
    AUD, CID, ClaimRead, ClaimValue, Claims, EXP, ISS, REVOCATION_SIGNATURE, SCOPE, USER_ID,
};
pub use decode::{CompactDecoder, DecodedToken, Decoder};
pub use directory::{Client, ClientRegistry, User, UserDirectory};
pub use error::{Error, ErrorKind, Result, ValidationError};
pub use header::TokenHeader;
pub use limits::DecodeLimits;
pub use validation::TokenValidation;
pub use verdict::Verdict;
