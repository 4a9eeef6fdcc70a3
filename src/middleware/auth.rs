use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const INSTRUCTOR_ROLES: [&str; 2] = ["teacher", "admin"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Who is making the request. Resolved once per request by [`resolve_session`]
/// and read by handlers through `Extension<Session>`.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Claims),
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(claims) => Some(claims.sub.as_str()),
        }
    }

    pub fn has_role(&self, roles: &[&str]) -> bool {
        match self {
            Session::Anonymous => false,
            Session::Authenticated(claims) => {
                let role = claims.role.as_deref().unwrap_or_default();
                roles.iter().any(|r| r.eq_ignore_ascii_case(role))
            }
        }
    }

    pub fn is_instructor(&self) -> bool {
        self.has_role(&INSTRUCTOR_ROLES)
    }

    pub fn require_user(&self) -> Result<&str> {
        self.user_id()
            .ok_or_else(|| Error::Unauthorized("sign in required".to_string()))
    }
}

fn unauthorized(code: &str) -> Response {
    Error::Unauthorized(code.to_string()).into_response()
}

fn decode_claims(token: &str) -> Option<Claims> {
    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// Signs a session token with the configured secret.
pub fn issue_token(user_id: &str, role: Option<&str>, ttl_secs: usize) -> Result<String> {
    let config = crate::config::get_config();
    let exp = chrono::Utc::now().timestamp() as usize + ttl_secs;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: role.map(str::to_string),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
}

/// Attaches a [`Session`] to every request. No header means anonymous; a
/// header that does not hold a valid bearer token is rejected.
pub async fn resolve_session(mut req: Request, next: Next) -> Response {
    let session = match req.headers().get(axum::http::header::AUTHORIZATION) {
        None => Session::Anonymous,
        Some(header) => {
            let Ok(raw) = header.to_str() else {
                return unauthorized("bad_authorization");
            };
            let Some(token) = raw.strip_prefix("Bearer ") else {
                return unauthorized("unsupported_scheme");
            };
            match decode_claims(token) {
                Some(claims) => Session::Authenticated(claims),
                None => return unauthorized("invalid_token"),
            }
        }
    };
    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Gate for the instructor route group. Runs after [`resolve_session`].
pub async fn require_instructor(req: Request, next: Next) -> Response {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .unwrap_or_default();
    match session {
        Session::Anonymous => unauthorized("missing_authorization"),
        s if !s.is_instructor() => Error::Forbidden("forbidden".to_string()).into_response(),
        _ => next.run(req).await,
    }
}
