//! Admin authentication: argon2 password login issuing short-lived JWTs.
//!
//! Buyers and sellers identify themselves by id in the request body; only
//! admin actions are gated here. Without `BL_AUTH_PASSWORD_HASH` configured
//! every admin action is refused.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::main_lib::AppState;

/// Header carrying the shared secret of an external cron trigger.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

const ADMIN_SUBJECT: &str = "bookloop-admin";

#[derive(Clone)]
pub struct AuthConfig {
    pub password_hash: String,
    pub jwt_secret: Vec<u8>,
    pub access_token_ttl: Duration,
}

pub struct AuthManager {
    password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid password")]
    InvalidCredentials,
    #[error("Admin authentication is not configured for this server")]
    NotConfigured,
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: u16,
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        PasswordHash::new(&config.password_hash)?;
        let encoding_key = EncodingKey::from_secret(&config.jwt_secret);
        let decoding_key = DecodingKey::from_secret(&config.jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.sub = Some(ADMIN_SUBJECT.to_string());
        Ok(Self {
            password_hash: config.password_hash.clone(),
            encoding_key,
            decoding_key,
            validation,
            token_ttl: config.access_token_ttl,
        })
    }

    pub fn verify_password(&self, candidate: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(&self.password_hash).map_err(|e| {
            AuthError::Internal(format!("Invalid password hash configuration: {e}"))
        })?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<(), AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|_| ())
            .map_err(|err| {
                tracing::debug!("Rejected admin token: {:?}", err.kind());
                AuthError::Unauthorized
            })
    }

    pub fn expires_in(&self) -> Duration {
        self.token_ttl
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unauthorized | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotConfigured => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(AuthErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Accepts only a valid admin bearer token.
pub fn verify_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AuthError> {
    let auth = state.auth.as_ref().ok_or(AuthError::NotConfigured)?;
    let token = bearer_token(headers).ok_or(AuthError::Unauthorized)?;
    auth.validate_token(token)
}

/// Accepts an admin bearer token or the configured cron secret.
pub fn verify_admin_or_cron(state: &AppState, headers: &HeaderMap) -> Result<(), AuthError> {
    let presented = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if let (Some(expected), Some(presented)) = (state.cron_secret.as_deref(), presented) {
        return if constant_time_eq(expected.as_bytes(), presented.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        };
    }
    if state.auth.is_none() && state.cron_secret.is_some() {
        return Err(AuthError::Unauthorized);
    }
    verify_admin(state, headers)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let auth = state.auth.as_ref().ok_or(AuthError::NotConfigured)?.clone();
    auth.verify_password(&payload.password)?;
    let token = auth.issue_token()?;
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: auth.expires_in().as_secs(),
    }))
}

/// Route layer for admin-only endpoints.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    verify_admin(&state, request.headers())?;
    Ok(next.run(request).await)
}
