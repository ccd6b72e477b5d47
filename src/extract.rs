//! Admin gate extractors: bearer token for the API, session cookie for the UI.

use crate::auth::principal::{Principal, PrincipalStore};
use crate::auth::session::{cookie_value, SessionData, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::Redirect,
};

/// Extractor for an admin principal resolved from the `Authorization` header.
/// The header carries the verbatim token; a leading `Bearer ` is tolerated.
/// Fails closed with 403 on a missing/invalid/expired token or a non-admin
/// principal; verification failures are never surfaced as errors.
pub struct AdminToken(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Forbidden)?;
        let claims = state.tokens.verify(token).ok_or(AppError::Forbidden)?;
        let principal = PrincipalStore::by_id(&state.pool, claims.id)
            .await?
            .ok_or(AppError::Forbidden)?;
        if !principal.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminToken(principal))
    }
}

/// Extractor for an admin session resolved from the session cookie.
/// Unauthenticated (or non-admin) requests redirect to the login form
/// instead of receiving a 403.
pub struct AdminSession(pub SessionData);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let login = format!("{}/login", state.admin_prefix);
        let session = cookie_value(&parts.headers, SESSION_COOKIE)
            .and_then(|id| state.sessions.get(&id))
            .ok_or_else(|| Redirect::to(&login))?;
        if !session.is_admin {
            return Err(Redirect::to(&login));
        }
        Ok(AdminSession(session))
    }
}
