//! Checks that consult signature keys, the user directory and the client registry

mod common;

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair};
use common::{SECRET, TokenBuilder, kinds};
use serde_json::json;
use std::collections::HashMap;
use tokenverdict::{
    AlgorithmType, Client, ClientRegistry, Error, ErrorKind, KeyVerifier, TokenValidation, User,
    UserDirectory,
};

fn users() -> HashMap<String, User> {
    HashMap::from([
        (
            "marissa".to_string(),
            User::new("marissa", ["openid", "cloud_controller.read", "uaa.user"]),
        ),
        ("shrunk".to_string(), User::new("shrunk", ["openid"])),
        ("locked".to_string(), User::revoked("locked")),
        ("empty".to_string(), User::new("empty", Vec::<String>::new())),
    ])
}

fn clients() -> HashMap<String, Client> {
    HashMap::from([
        (
            "app".to_string(),
            Client::new("app", ["openid", "cloud_controller.read"]),
        ),
        ("narrow".to_string(), Client::new("narrow", ["openid"])),
    ])
}

/// Directory whose backend is unreachable
struct Offline;

impl UserDirectory for Offline {
    fn find_by_id(&self, _user_id: &str) -> tokenverdict::Result<User> {
        Err(Error::Directory("connection refused".into()))
    }
}

impl ClientRegistry for Offline {
    fn find_by_id(&self, _client_id: &str) -> tokenverdict::Result<Client> {
        Err(Error::Directory("connection refused".into()))
    }
}

fn token_for(user_id: &str) -> String {
    TokenBuilder::new()
        .claim("user_id", user_id)
        .claim("scope", json!(["openid", "cloud_controller.read"]))
        .generate()
}

// ============================================================================
// Signature
// ============================================================================

#[test]
fn test_signature_valid() {
    let token = TokenBuilder::new().standard_valid_claims().generate();
    let verifier = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();

    let mut validation = TokenValidation::validate(&token);
    validation.check_signature(&verifier);
    assert!(validation.is_valid());
}

#[test]
fn test_signature_invalid_keeps_checking_claims() {
    let token = TokenBuilder::new()
        .standard_valid_claims()
        .sign(b"another-secret");
    let verifier = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();

    let mut validation = TokenValidation::validate(&token);
    validation
        .check_signature(&verifier)
        .check_issuer(common::ISSUER)
        .check_expiry(0);

    assert!(validation.is_decoded());
    assert_eq!(kinds(&validation), [ErrorKind::SignatureError]);
    assert_eq!(
        validation.errors()[0].cause(),
        Some(&Error::SignatureInvalid)
    );
}

#[test]
fn test_signature_algorithm_confusion() {
    let token = TokenBuilder::new()
        .header(json!({"alg": "HS512"}))
        .standard_valid_claims()
        .generate();
    let verifier = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();

    let mut validation = TokenValidation::validate(&token);
    validation.check_signature(&verifier);
    assert!(matches!(
        validation.errors()[0].cause(),
        Some(Error::AlgorithmMismatch { .. })
    ));
}

#[test]
fn test_signature_none_rejected() {
    let token = TokenBuilder::new()
        .header(json!({"alg": "none"}))
        .standard_valid_claims()
        .generate();
    let verifier = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();

    let mut validation = TokenValidation::validate(&token);
    validation.check_signature(&verifier);
    assert_eq!(kinds(&validation), [ErrorKind::SignatureError]);
    assert_eq!(
        validation.errors()[0].cause(),
        Some(&Error::AlgorithmNoneRejected)
    );
}

#[test]
fn test_signature_es256_key_pair() {
    let rng = SystemRandom::new();
    let signer = EcdsaKeyPair::generate(&ECDSA_P256_SHA256_FIXED_SIGNING).unwrap();
    let other = EcdsaKeyPair::generate(&ECDSA_P256_SHA256_FIXED_SIGNING).unwrap();
    let token = TokenBuilder::new()
        .header(json!({"alg": "ES256", "typ": "JWT"}))
        .standard_valid_claims()
        .sign_with(|input| signer.sign(&rng, input).unwrap().as_ref().to_vec());

    let verifier =
        KeyVerifier::public_key(AlgorithmType::ES256, signer.public_key().as_ref()).unwrap();
    let mut validation = TokenValidation::validate(&token);
    validation
        .check_signature(&verifier)
        .check_issuer(common::ISSUER);
    assert!(validation.is_valid(), "{:?}", validation.errors());

    let stranger =
        KeyVerifier::public_key(AlgorithmType::ES256, other.public_key().as_ref()).unwrap();
    let mut validation = TokenValidation::validate(&token);
    validation.check_signature(&stranger);
    assert_eq!(kinds(&validation), [ErrorKind::SignatureError]);

    // An HMAC verifier never accepts an ES256 header
    let hmac = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();
    let mut validation = TokenValidation::validate(&token);
    validation.check_signature(&hmac);
    assert!(matches!(
        validation.errors()[0].cause(),
        Some(Error::AlgorithmMismatch { .. })
    ));
}

// ============================================================================
// User
// ============================================================================

#[test]
fn test_user_with_covering_authorities() {
    let mut validation = TokenValidation::validate(&token_for("marissa"));
    validation.check_user(&users());
    assert!(validation.is_valid());
}

#[test]
fn test_user_authorities_shrunk() {
    let mut validation = TokenValidation::validate(&token_for("shrunk"));
    validation.check_user(&users());
    assert_eq!(kinds(&validation), [ErrorKind::RevokedScope]);
    assert_eq!(
        validation.errors()[0].message(),
        "Some scopes have been revoked: cloud_controller.read"
    );
}

#[test]
fn test_user_fully_revoked() {
    for user_id in ["locked", "empty"] {
        let mut validation = TokenValidation::validate(&token_for(user_id));
        validation.check_user(&users());
        assert_eq!(kinds(&validation), [ErrorKind::RevokedToken], "{user_id}");
    }
}

#[test]
fn test_user_unknown() {
    let mut validation = TokenValidation::validate(&token_for("nobody"));
    validation.check_user(&users());
    assert_eq!(kinds(&validation), [ErrorKind::UnknownUser]);
    assert_eq!(
        validation.errors()[0].cause(),
        Some(&Error::UserNotFound("nobody".into()))
    );
}

#[test]
fn test_user_lookup_failure() {
    let mut validation = TokenValidation::validate(&token_for("marissa"));
    validation.check_user(Offline);
    assert_eq!(kinds(&validation), [ErrorKind::UnknownUser]);
    assert!(matches!(
        validation.errors()[0].cause(),
        Some(Error::Directory(_))
    ));
}

#[test]
fn test_user_id_shapes() {
    let cases = [
        (None, ErrorKind::MissingClaim),
        (Some(json!(null)), ErrorKind::MissingClaim),
        (Some(json!(12)), ErrorKind::MalformedClaim),
        (Some(json!(["marissa"])), ErrorKind::MalformedClaim),
    ];

    for (user_id, expected) in cases {
        let mut builder = TokenBuilder::new().claim("scope", json!(["openid"]));
        if let Some(user_id) = user_id {
            builder = builder.claim("user_id", user_id);
        }
        let mut validation = TokenValidation::validate(&builder.generate());
        validation.check_user(&users());
        assert_eq!(kinds(&validation), [expected]);
    }
}

#[test]
fn test_user_and_scope_share_scope_resolution() {
    let token = TokenBuilder::new().claim("user_id", "marissa").generate();
    let mut validation = TokenValidation::validate(&token);
    validation
        .check_user(&users())
        .check_scopes_include(["openid"]);

    assert_eq!(kinds(&validation), [ErrorKind::MissingClaim]);
    assert_eq!(
        validation.errors()[0].message(),
        "The token does not bear a SCOPE claim."
    );
}

// ============================================================================
// Client
// ============================================================================

#[test]
fn test_client_with_covering_scopes() {
    let token = TokenBuilder::new().standard_valid_claims().generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(&clients());
    assert!(validation.is_valid());
}

#[test]
fn test_client_scopes_shrunk() {
    let token = TokenBuilder::new()
        .claim("cid", "narrow")
        .claim("scope", json!(["openid", "cloud_controller.read"]))
        .generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(&clients());
    assert_eq!(kinds(&validation), [ErrorKind::RevokedScope]);
}

#[test]
fn test_client_unknown() {
    let token = TokenBuilder::new()
        .claim("cid", "ghost")
        .claim("scope", json!([]))
        .generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(&clients());
    assert_eq!(kinds(&validation), [ErrorKind::UnknownClient]);
    assert_eq!(
        validation.errors()[0].message(),
        "The token refers to a non-existent client: ghost"
    );
}

#[test]
fn test_client_lookup_failure() {
    let token = TokenBuilder::new().standard_valid_claims().generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(Offline);
    assert_eq!(kinds(&validation), [ErrorKind::UnknownClient]);
}

#[test]
fn test_client_id_shapes() {
    let token = TokenBuilder::new().claim("scope", json!([])).generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(&clients());
    assert_eq!(kinds(&validation), [ErrorKind::MissingClaim]);

    let token = TokenBuilder::new().claim("cid", json!(false)).generate();
    let mut validation = TokenValidation::validate(&token);
    validation.check_client(&clients());
    assert_eq!(kinds(&validation), [ErrorKind::MalformedClaim]);
}

#[test]
fn test_full_policy() {
    let token = TokenBuilder::new().standard_valid_claims().generate();
    let verifier = KeyVerifier::hmac(AlgorithmType::HS256, SECRET).unwrap();

    let mut validation = TokenValidation::validate(&token);
    validation
        .check_signature(&verifier)
        .check_issuer(common::ISSUER)
        .check_expiry_now()
        .check_user(&users())
        .check_client(&clients())
        .check_scopes_include(["openid"])
        .check_revocation_hash("a1b2c3")
        .check_audience(["cloud_controller"]);

    assert!(validation.is_valid(), "{:?}", validation.errors());
}
