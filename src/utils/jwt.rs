// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, state::AppState};

/// Claims carried by an identity token.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Identity provider user id; also the suffix of the response document key.
    pub sub: String,
    pub email: String,
    /// Unix seconds.
    pub exp: usize,
}

/// Authenticated caller, placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

/// Turns a bearer credential into a verified principal.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, AppError>;
}

/// HS256 verifier sharing its secret with the token issuer.
#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let claims = verify_jwt(token, &self.secret)?;
        let email = claims.email.trim();
        if email.is_empty() {
            return Err(AppError::AuthError("Token has no email claim".to_string()));
        }
        Ok(Principal {
            uid: claims.sub,
            email: email.to_string(),
        })
    }
}

/// Issues an HS256 token for `uid` / `email` valid for `expiration_seconds`.
/// Used by tooling and tests; production tokens come from the identity provider.
pub fn sign_jwt(
    uid: &str,
    email: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();

    let claims = Claims {
        sub: uid.to_owned(),
        email: email.to_owned(),
        exp: (now + expiration_seconds) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Decodes `token`, checking signature and expiry.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::AuthError("Token expired".to_string()),
            _ => AppError::AuthError("Invalid token".to_string()),
        })
}

/// `Authorization: Bearer <token>` value, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a verifiable bearer token (401) and injects the
/// caller's `Principal` otherwise.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

    let principal = state.verifier.verify(token)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Must run after `auth_middleware`. Callers whose email is not on the
/// configured admin allowlist get 403.
pub async fn admin_middleware(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))?;

    if !config.is_admin(&principal.email) {
        tracing::warn!("Rejected admin request from {}", principal.email);
        return Err(AppError::Forbidden(
            "Not an authorized administrator".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
