//! The validation context and its checks
//!
//! A [`TokenValidation`] is created once per presented token and then run
//! through whichever checks the caller's policy requires, in any order:
//!
//! ```ignore
//! let verdict = TokenValidation::validate(token)
//!     .check_signature(&verifier)
//!     .check_issuer("https://uaa.example.com/oauth/token")
//!     .check_expiry_now()
//!     .check_scopes_include(["openid"])
//!     .check_revocation_hash(&current_hash)
//!     .verdict();
//! ```
//!
//! Checks never short-circuit each other and never return an error to the
//! caller. Each failure is appended to the context and the chain continues,
//! so the final [`Verdict`] lists every reason the token is not acceptable.

use crate::algorithm::SignatureVerifier;
use crate::claims::{
    AUD, CID, ClaimRead, ClaimValue, Claims, EXP, ISS, REVOCATION_SIGNATURE, USER_ID,
};
use crate::decode::{CompactDecoder, DecodedToken, Decoder};
use crate::directory::{ClientRegistry, User, UserDirectory};
use crate::error::{Error, ErrorKind, ValidationError};
use crate::scope::ScopeCache;
use crate::utils::bounds::current_timestamp;
use crate::verdict::Verdict;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Validation context for one presented token
///
/// Methods mutate the context and return it for chaining. A context is not
/// meant to be shared between threads; use [`fork`](Self::fork) to evaluate
/// another policy against the same decoded token.
#[derive(Debug)]
pub struct TokenValidation {
    raw_token: Arc<str>,
    token: Option<Arc<DecodedToken>>,
    /// Empty unless `decode_ok`
    claims: Arc<Claims>,
    decode_ok: bool,
    errors: Vec<ValidationError>,
    scopes: ScopeCache,
}

impl TokenValidation {
    /// Decode `token` with the default [`CompactDecoder`]
    pub fn validate(token: &str) -> Self {
        Self::with_decoder(token, CompactDecoder::new())
    }

    /// Decode `token` with a custom decoder
    pub fn with_decoder<D: Decoder>(token: &str, decoder: D) -> Self {
        let mut errors = Vec::new();

        let decoded = decoder
            .decode(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Invalid token (could not decode)");
                errors.push(ValidationError::with_cause(
                    ErrorKind::DecodeError,
                    format!("Invalid token (could not decode): {token}"),
                    e,
                ));
            })
            .ok();

        let decoded = decoded.and_then(|decoded| {
            Claims::from_json(decoded.payload())
                .map_err(|e| {
                    tracing::debug!(error = %e, "Invalid token (cannot read token claims)");
                    errors.push(ValidationError::with_cause(
                        ErrorKind::DecodeError,
                        format!("Invalid token (cannot read token claims): {token}"),
                        e,
                    ));
                })
                .ok()
                .map(|claims| (decoded, claims))
        });

        let (token_parts, claims, decode_ok) = match decoded {
            Some((decoded, claims)) => (Some(Arc::new(decoded)), Arc::new(claims), true),
            None => (None, Arc::new(Claims::default()), false),
        };

        Self {
            raw_token: token.into(),
            token: token_parts,
            claims,
            decode_ok,
            errors,
            scopes: ScopeCache::default(),
        }
    }

    /// Start a fresh policy evaluation over the same decoded token
    ///
    /// The fork shares the decoded claims and decode outcome but begins with
    /// no errors and an unresolved scope cache. Errors recorded on either
    /// context afterwards are not visible to the other.
    ///
    /// A fork of a token that failed to decode does not carry the decode
    /// error, and a signature-only policy on it comes out valid. Check
    /// [`is_decoded`](Self::is_decoded) before trusting such a verdict.
    pub fn fork(&self) -> Self {
        Self {
            raw_token: Arc::clone(&self.raw_token),
            token: self.token.clone(),
            claims: Arc::clone(&self.claims),
            decode_ok: self.decode_ok,
            errors: Vec::new(),
            scopes: ScopeCache::default(),
        }
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    /// Whether the token decoded into a claims mapping
    pub fn is_decoded(&self) -> bool {
        self.decode_ok
    }

    /// Decoded claims, empty if decoding failed
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors recorded so far, in the order the checks ran
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::new(self.errors.clone())
    }

    pub fn into_verdict(self) -> Verdict {
        Verdict::new(self.errors)
    }

    fn push(&mut self, error: ValidationError) -> &mut Self {
        tracing::trace!(kind = %error.kind(), "{error}");
        self.errors.push(error);
        self
    }

    fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> &mut Self {
        self.push(ValidationError::new(kind, message))
    }

    /// Verify the token signature
    ///
    /// Skipped when the token did not decode. A bad signature does not stop
    /// the claim checks that follow.
    pub fn check_signature<V: SignatureVerifier>(&mut self, verifier: V) -> &mut Self {
        let Some(token) = self.token.clone() else {
            return self;
        };

        match verifier.verify(&token) {
            Ok(()) => self,
            Err(e) => {
                tracing::debug!(error = %e, "Invalid token (could not verify signature)");
                let message = format!(
                    "Invalid token (could not verify signature): {}",
                    self.raw_token
                );
                self.push(ValidationError::with_cause(ErrorKind::SignatureError, message, e))
            }
        }
    }

    /// Require `iss` to equal `issuer` exactly
    pub fn check_issuer(&mut self, issuer: &str) -> &mut Self {
        let claims = Arc::clone(&self.claims);
        match claims.string(ISS) {
            ClaimRead::Found(iss) if iss == issuer => self,
            ClaimRead::Found(iss) => self.fail(
                ErrorKind::InvalidIssuer,
                format!("Invalid issuer for token: {iss}"),
            ),
            ClaimRead::Absent => {
                self.fail(ErrorKind::MissingClaim, "Token does not bear an ISS claim.")
            }
            ClaimRead::Null | ClaimRead::Malformed => self.fail(
                ErrorKind::MalformedClaim,
                "Token bears an invalid or unparseable ISS claim.",
            ),
        }
    }

    /// Require the token not to be expired at `as_of` (seconds since the Unix epoch)
    ///
    /// A token is still valid in the second named by its `exp`.
    pub fn check_expiry(&mut self, as_of: i64) -> &mut Self {
        match self.claims.integer(EXP) {
            ClaimRead::Found(expiry) if as_of > expiry => {
                self.fail(ErrorKind::ExpiredToken, format!("Token expired at {expiry}"))
            }
            ClaimRead::Found(_) => self,
            ClaimRead::Absent => {
                self.fail(ErrorKind::MissingClaim, "Token does not bear an EXP claim.")
            }
            ClaimRead::Null | ClaimRead::Malformed => self.fail(
                ErrorKind::MalformedClaim,
                "Token bears an invalid or unparseable EXP claim.",
            ),
        }
    }

    /// [`check_expiry`](Self::check_expiry) against the system clock
    pub fn check_expiry_now(&mut self) -> &mut Self {
        self.check_expiry(current_timestamp())
    }

    /// Require `user_id` to name a user whose current authorities still
    /// cover every scope of the token
    pub fn check_user<D: UserDirectory>(&mut self, users: D) -> &mut Self {
        let claims = Arc::clone(&self.claims);
        let user_id = match claims.string(USER_ID) {
            ClaimRead::Found(user_id) => user_id,
            ClaimRead::Absent => {
                return self.fail(
                    ErrorKind::MissingClaim,
                    "Token does not bear a USER_ID claim.",
                );
            }
            ClaimRead::Null => {
                return self.fail(ErrorKind::MissingClaim, "Token has a null USER_ID claim.");
            }
            ClaimRead::Malformed => {
                return self.fail(
                    ErrorKind::MalformedClaim,
                    "Token bears an invalid or unparseable USER_ID claim.",
                );
            }
        };

        match users.find_by_id(user_id) {
            Ok(User {
                authorities: Some(authorities),
                ..
            }) if !authorities.is_empty() => self.check_scopes_within(&authorities),
            Ok(_) => self.fail(
                ErrorKind::RevokedToken,
                "Invalid token (all scopes have been revoked)",
            ),
            Err(e @ Error::UserNotFound(_)) => self.push(ValidationError::with_cause(
                ErrorKind::UnknownUser,
                format!("Token bears a non-existent user ID: {user_id}"),
                e,
            )),
            Err(e) => {
                tracing::debug!(error = %e, user_id, "User lookup failed");
                self.push(ValidationError::with_cause(
                    ErrorKind::UnknownUser,
                    format!("Found no data for user ID: {user_id}"),
                    e,
                ))
            }
        }
    }

    /// Require the token to carry every scope in `required`
    ///
    /// All missing scopes are reported in a single error.
    pub fn check_scopes_include<I, S>(&mut self, required: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(token_scopes) =
            self.scopes
                .resolve(&self.claims, self.decode_ok, &mut self.errors)
        else {
            return self;
        };

        let missing: Vec<String> = required
            .into_iter()
            .map(|scope| scope.as_ref().to_string())
            .filter(|scope| !token_scopes.contains(scope))
            .collect();

        if missing.is_empty() {
            self
        } else {
            self.push(ValidationError::new(
                ErrorKind::InsufficientScope,
                format!("Some expected scopes are missing: {}", missing.join(" ")),
            ))
        }
    }

    /// Require every scope of the token to appear in `allowed`
    ///
    /// All excess scopes are reported in a single error.
    pub fn check_scopes_within<I, S>(&mut self, allowed: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: BTreeSet<String> = allowed
            .into_iter()
            .map(|scope| scope.as_ref().to_string())
            .collect();

        let Some(token_scopes) =
            self.scopes
                .resolve(&self.claims, self.decode_ok, &mut self.errors)
        else {
            return self;
        };

        let revoked: Vec<&str> = token_scopes
            .iter()
            .map(String::as_str)
            .filter(|scope| !allowed.contains(*scope))
            .collect();

        if revoked.is_empty() {
            return self;
        }
        let message = format!("Some scopes have been revoked: {}", revoked.join(" "));
        self.fail(ErrorKind::RevokedScope, message)
    }

    /// Require `cid` to name a registered client whose allowed scopes still
    /// cover every scope of the token
    pub fn check_client<R: ClientRegistry>(&mut self, clients: R) -> &mut Self {
        let claims = Arc::clone(&self.claims);
        let client_id = match claims.string(CID) {
            ClaimRead::Found(client_id) => client_id,
            ClaimRead::Absent => {
                return self.fail(ErrorKind::MissingClaim, "Token does not bear a CID claim.");
            }
            ClaimRead::Null | ClaimRead::Malformed => {
                return self.fail(
                    ErrorKind::MalformedClaim,
                    "Token bears an invalid or unparseable CID claim.",
                );
            }
        };

        match clients.find_by_id(client_id) {
            Ok(client) => self.check_scopes_within(&client.allowed_scopes),
            Err(e @ Error::ClientNotFound(_)) => self.push(ValidationError::with_cause(
                ErrorKind::UnknownClient,
                format!("The token refers to a non-existent client: {client_id}"),
                e,
            )),
            Err(e) => {
                tracing::debug!(error = %e, client_id, "Client lookup failed");
                self.push(ValidationError::with_cause(
                    ErrorKind::UnknownClient,
                    format!("Found no data for client ID: {client_id}"),
                    e,
                ))
            }
        }
    }

    /// Require the revocation fingerprint to equal `current_hash`
    ///
    /// Tokens without a `rev_sig` claim predate revocation hashing and pass.
    /// A present but empty or non-string fingerprint never matches.
    pub fn check_revocation_hash(&mut self, current_hash: &str) -> &mut Self {
        if !self.decode_ok {
            return self.fail(
                ErrorKind::MissingClaim,
                "Token does not bear a revocation hash.",
            );
        }

        let claims = Arc::clone(&self.claims);
        match claims.string(REVOCATION_SIGNATURE) {
            ClaimRead::Absent => self,
            ClaimRead::Found(hash) if !hash.is_empty() && hash == current_hash => self,
            _ => {
                let message = format!("Token has been revoked: {}", self.raw_token);
                self.fail(ErrorKind::RevokedToken, message)
            }
        }
    }

    /// Require every party in `expected` to appear in `aud`
    ///
    /// `aud` may be a single string or a list of strings; `null` counts as an
    /// empty audience. All missing parties are reported in a single error.
    pub fn check_audience<I, S>(&mut self, expected: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let claims = Arc::clone(&self.claims);
        let audience = match claims.read(AUD, ClaimValue::as_one_or_many) {
            ClaimRead::Found(audience) => audience,
            ClaimRead::Null => Vec::new(),
            ClaimRead::Absent => {
                return self.fail(
                    ErrorKind::MissingClaim,
                    "The token does not bear an AUD claim.",
                );
            }
            ClaimRead::Malformed => {
                return self.fail(
                    ErrorKind::MalformedClaim,
                    "The token's audience claim is invalid or unparseable.",
                );
            }
        };

        let missing: Vec<String> = expected
            .into_iter()
            .map(|party| party.as_ref().to_string())
            .filter(|party| !audience.contains(&party.as_str()))
            .collect();

        if missing.is_empty() {
            self
        } else {
            self.fail(
                ErrorKind::AudienceMismatch,
                format!(
                    "Some parties were not in the token audience: {}",
                    missing.join(", ")
                ),
            )
        }
    }
}
