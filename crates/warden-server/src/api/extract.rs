//! Request extractors: JSON bodies with enveloped rejections, and
//! bearer-authenticated principals.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use surrealdb::Connection;
use uuid::Uuid;
use warden_auth::{AuthenticatedAdmin, AuthenticatedClientUser};
use warden_core::error::WardenError;

use super::response::ApiError;
use crate::state::AppState;

/// Like [`Json`], but malformed bodies become `validation_error`
/// envelopes instead of plain-text rejections.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| WardenError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

fn authorization(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// An admin authenticated by bearer token.
pub struct AdminBearer(pub AuthenticatedAdmin);

impl<C: Connection> FromRequestParts<AppState<C>> for AdminBearer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        let admin = state.gate.authenticate_admin(authorization(parts)).await?;
        Ok(Self(admin))
    }
}

/// A client user authenticated by bearer token.
pub struct ClientUserBearer(pub AuthenticatedClientUser);

impl<C: Connection> FromRequestParts<AppState<C>> for ClientUserBearer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .gate
            .authenticate_client_user(authorization(parts))
            .await?;
        Ok(Self(principal))
    }
}

pub fn parse_client_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(WardenError::validation("client_id must be a UUID")))
}
