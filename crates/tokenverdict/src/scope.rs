//! Memoized resolution of a token's own scopes

use crate::claims::{ClaimRead, Claims, SCOPE};
use crate::error::{ErrorKind, ValidationError};

/// Scope resolution state of one validation context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum ScopeCache {
    #[default]
    NotComputed,
    /// Resolution failed; the failure has already been reported
    Unavailable,
    Resolved(Vec<String>),
}

impl ScopeCache {
    /// Resolve the `scope` claim on first use and reuse the outcome afterwards
    ///
    /// A failed resolution appends exactly one error, on the first call only.
    /// An explicit `null` claim resolves to an empty list.
    pub(crate) fn resolve(
        &mut self,
        claims: &Claims,
        decoded: bool,
        errors: &mut Vec<ValidationError>,
    ) -> Option<&[String]> {
        if matches!(self, ScopeCache::NotComputed) {
            *self = match resolve_scope_claim(claims, decoded) {
                Ok(scopes) => ScopeCache::Resolved(scopes),
                Err(error) => {
                    tracing::trace!(kind = %error.kind(), "{error}");
                    errors.push(error);
                    ScopeCache::Unavailable
                }
            };
        }

        match &*self {
            ScopeCache::Resolved(scopes) => Some(scopes.as_slice()),
            _ => None,
        }
    }
}

fn resolve_scope_claim(
    claims: &Claims,
    decoded: bool,
) -> std::result::Result<Vec<String>, ValidationError> {
    let missing = || {
        ValidationError::new(
            ErrorKind::MissingClaim,
            "The token does not bear a SCOPE claim.",
        )
    };

    if !decoded {
        return Err(missing());
    }

    match claims.string_list(SCOPE) {
        ClaimRead::Found(scopes) => Ok(scopes.to_vec()),
        ClaimRead::Null => Ok(Vec::new()),
        ClaimRead::Absent => Err(missing()),
        ClaimRead::Malformed => Err(ValidationError::new(
            ErrorKind::MalformedClaim,
            "The token's scope claim is invalid or unparseable.",
        )),
    }
}
