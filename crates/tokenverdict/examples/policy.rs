//! Run with
//!
//! ```not_rust
//! RUST_LOG=tokenverdict=trace cargo run --example policy -- <token>
//! ```
//!
//! Validates a token against a fixed demo policy and prints every failure.

use std::collections::HashMap;

use tokenverdict::{AlgorithmType, Client, KeyVerifier, TokenValidation, User};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokenverdict=debug,policy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(token) = std::env::args().nth(1) else {
        eprintln!("usage: policy <token>");
        std::process::exit(2);
    };

    let verifier = match KeyVerifier::hmac(AlgorithmType::HS256, b"tokenverdict-demo-secret") {
        Ok(verifier) => verifier,
        Err(e) => {
            tracing::error!("cannot build verifier: {e}");
            std::process::exit(1);
        }
    };
    let users = HashMap::from([(
        "marissa".to_string(),
        User::new("marissa", ["openid", "cloud_controller.read"]),
    )]);
    let clients = HashMap::from([(
        "app".to_string(),
        Client::new("app", ["openid", "cloud_controller.read"]),
    )]);

    let mut validation = TokenValidation::validate(&token);
    validation
        .check_signature(&verifier)
        .check_issuer("http://localhost:8080/uaa/oauth/token")
        .check_expiry_now()
        .check_user(&users)
        .check_client(&clients)
        .check_audience(["app"]);

    // Same token, narrower policy, without re-decoding
    let mut admin = validation.fork();
    admin.check_scopes_include(["uaa.admin"]);

    for (policy, verdict) in [("default", validation.verdict()), ("admin", admin.verdict())] {
        if verdict.is_valid() {
            tracing::info!(policy, "token accepted");
            continue;
        }
        for error in verdict.errors() {
            tracing::warn!(policy, kind = %error.kind(), "{error}");
        }
    }
}
