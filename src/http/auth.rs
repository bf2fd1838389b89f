use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{blocking, AppState};
use crate::error::NotebridgeError;
use crate::models::User;

/// The caller, resolved from HTTP Basic credentials
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = NotebridgeError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthenticated("Missing credentials"))?;
        let (username, password) = parse_basic(header)?;

        let users = state.users.clone();
        let user = blocking(move || users.authenticate(&username, &password)).await?;

        Ok(Self(user))
    }
}

fn unauthenticated(msg: &str) -> NotebridgeError {
    NotebridgeError::Unauthenticated(msg.to_string())
}

/// Split an `Authorization: Basic ...` value into username and password
fn parse_basic(header: &str) -> Result<(String, String), NotebridgeError> {
    let (scheme, encoded) = header
        .split_once(' ')
        .ok_or_else(|| unauthenticated("Malformed Authorization header"))?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(unauthenticated("Unsupported authorization scheme"));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| unauthenticated("Malformed Basic credentials"))?;
    let decoded = String::from_utf8(decoded).map_err(|_| unauthenticated("Malformed Basic credentials"))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| unauthenticated("Malformed Basic credentials"))?;

    Ok((username.to_string(), password.to_string()))
}
