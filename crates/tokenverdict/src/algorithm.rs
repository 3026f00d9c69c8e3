//! Signature verification
use crate::decode::DecodedToken;
use crate::error::{Error, Result};
use crate::limits::MAX_ALG_LENGTH;

use aws_lc_rs::hmac;
use aws_lc_rs::signature::{self, UnparsedPublicKey};

/// Checks the signature of a decoded token
pub trait SignatureVerifier {
    fn verify(&self, token: &DecodedToken) -> Result<()>;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, token: &DecodedToken) -> Result<()> {
        (**self).verify(token)
    }
}

/// Algorithm identifier from the token header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmType {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
}

impl AlgorithmType {
    pub(crate) fn from_str(s: &str) -> Result<Self> {
        if s.len() > MAX_ALG_LENGTH {
            return Err(Error::AlgorithmUnsupported(format!(
                "Algorithm string too long: {} bytes (maximum: {} bytes)",
                s.len(),
                MAX_ALG_LENGTH
            )));
        }

        match s {
            "none" => Err(Error::AlgorithmNoneRejected),
            "HS256" => Ok(AlgorithmType::HS256),
            "HS384" => Ok(AlgorithmType::HS384),
            "HS512" => Ok(AlgorithmType::HS512),
            "RS256" => Ok(AlgorithmType::RS256),
            "RS384" => Ok(AlgorithmType::RS384),
            "RS512" => Ok(AlgorithmType::RS512),
            "ES256" => Ok(AlgorithmType::ES256),
            "ES384" => Ok(AlgorithmType::ES384),
            "ES512" => Ok(AlgorithmType::ES512),
            _ => Err(Error::AlgorithmUnsupported(s.into())),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::HS256 => "HS256",
            AlgorithmType::HS384 => "HS384",
            AlgorithmType::HS512 => "HS512",
            AlgorithmType::RS256 => "RS256",
            AlgorithmType::RS384 => "RS384",
            AlgorithmType::RS512 => "RS512",
            AlgorithmType::ES256 => "ES256",
            AlgorithmType::ES384 => "ES384",
            AlgorithmType::ES512 => "ES512",
        }
    }

    pub const fn is_hmac(&self) -> bool {
        matches!(
            self,
            AlgorithmType::HS256 | AlgorithmType::HS384 | AlgorithmType::HS512
        )
    }

    fn hmac_algorithm(&self) -> Option<hmac::Algorithm> {
        match self {
            AlgorithmType::HS256 => Some(hmac::HMAC_SHA256),
            AlgorithmType::HS384 => Some(hmac::HMAC_SHA384),
            AlgorithmType::HS512 => Some(hmac::HMAC_SHA512),
            _ => None,
        }
    }

    /// Note: ECDSA signatures use IEEE P1363 format (fixed-length R||S),
    /// not ASN.1 DER encoding, as per RFC 7518 Section 3.4.
    fn verification_algorithm(&self) -> Option<&'static dyn signature::VerificationAlgorithm> {
        match self {
            AlgorithmType::RS256 => Some(&signature::RSA_PKCS1_2048_8192_SHA256),
            AlgorithmType::RS384 => Some(&signature::RSA_PKCS1_2048_8192_SHA384),
            AlgorithmType::RS512 => Some(&signature::RSA_PKCS1_2048_8192_SHA512),
            AlgorithmType::ES256 => Some(&signature::ECDSA_P256_SHA256_FIXED),
            AlgorithmType::ES384 => Some(&signature::ECDSA_P384_SHA384_FIXED),
            AlgorithmType::ES512 => Some(&signature::ECDSA_P521_SHA512_FIXED),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone)]
enum VerificationKey {
    Secret(hmac::Algorithm, Vec<u8>),
    PublicKey(Vec<u8>),
}

/// Verifier bound to one algorithm and one key
///
/// The token header must name exactly the configured algorithm. This rules
/// out algorithm confusion between HMAC secrets and public keys.
#[derive(Clone)]
pub struct KeyVerifier {
    algorithm: AlgorithmType,
    key: VerificationKey,
}

impl KeyVerifier {
    /// Verifier for HS256/HS384/HS512 with a shared secret
    pub fn hmac(algorithm: AlgorithmType, secret: &[u8]) -> Result<Self> {
        let hmac_algorithm = algorithm.hmac_algorithm().ok_or_else(|| {
            Error::KeyInvalid(format!("{algorithm} does not take a shared secret"))
        })?;
        Ok(Self {
            algorithm,
            key: VerificationKey::Secret(hmac_algorithm, secret.to_vec()),
        })
    }

    /// Verifier for RSA or ECDSA with a DER-encoded public key
    pub fn public_key(algorithm: AlgorithmType, key_der: &[u8]) -> Result<Self> {
        if algorithm.is_hmac() {
            return Err(Error::KeyInvalid(format!(
                "{algorithm} does not take a public key"
            )));
        }
        Ok(Self {
            algorithm,
            key: VerificationKey::PublicKey(key_der.to_vec()),
        })
    }

    pub fn algorithm(&self) -> AlgorithmType {
        self.algorithm
    }
}

impl std::fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVerifier")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier for KeyVerifier {
    fn verify(&self, token: &DecodedToken) -> Result<()> {
        let found = AlgorithmType::from_str(&token.header().algorithm)?;
        if found != self.algorithm {
            return Err(Error::AlgorithmMismatch {
                expected: self.algorithm.to_string(),
                found: found.to_string(),
            });
        }

        match &self.key {
            VerificationKey::Secret(hmac_algorithm, secret) => {
                let key = hmac::Key::new(*hmac_algorithm, secret);
                hmac::verify(&key, token.signing_input(), token.signature())
                    .map_err(|_| Error::SignatureInvalid)
            }
            VerificationKey::PublicKey(key_der) => {
                let algorithm = self
                    .algorithm
                    .verification_algorithm()
                    .ok_or_else(|| Error::AlgorithmUnsupported(self.algorithm.to_string()))?;
                UnparsedPublicKey::new(algorithm, key_der.as_slice())
                    .verify(token.signing_input(), token.signature())
                    .map_err(|_| Error::SignatureInvalid)
            }
        }
    }
}
