use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::{common::errors::ApiError, sources::TokenState};

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
pub const EXPIRES_AT_HEADER: &str = "x-token-expires-at";

const ACCESS_COOKIE: &str = "sp_access_token";
const REFRESH_COOKIE: &str = "sp_refresh_token";
const EXPIRES_COOKIE: &str = "sp_expires_at";

/// The caller's Spotify credentials, taken from request headers or, for
/// `EventSource` clients that cannot set headers, from cookies.
#[derive(Debug)]
pub struct SessionTokens(pub TokenState);

impl<S: Send + Sync> FromRequestParts<S> for SessionTokens {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        tokens_from_headers(&parts.headers)
            .map(SessionTokens)
            .ok_or_else(|| ApiError::Unauthorized("Missing Spotify access token".into()))
    }
}

fn tokens_from_headers(headers: &HeaderMap) -> Option<TokenState> {
    let cookies = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let access_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .map(str::to_string)
        .or_else(|| cookie(&cookies, ACCESS_COOKIE))
        .filter(|t| !t.is_empty())?;

    let refresh_token = header_str(headers, REFRESH_TOKEN_HEADER)
        .or_else(|| cookie(&cookies, REFRESH_COOKIE))
        .filter(|t| !t.is_empty());

    let expires_at_ms = header_str(headers, EXPIRES_AT_HEADER)
        .or_else(|| cookie(&cookies, EXPIRES_COOKIE))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    Some(TokenState::new(access_token, refresh_token, expires_at_ms))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

fn cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}
