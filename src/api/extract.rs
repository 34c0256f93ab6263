//! Request extractors: caller identity and validated JSON bodies.

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ApiError;
use crate::domain::value_objects::UserId;

/// Header the upstream auth layer sets to the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// A user already authenticated upstream. This service trusts the header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok()).ok_or_else(ApiError::unauthorized)?;
        UserId::new(raw).map(Self).map_err(|_| ApiError::unauthorized())
    }
}

/// Identity for routes guests may also call. No header means a guest; a
/// header that is present but unreadable or blank is rejected rather than
/// read as a guest.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserId>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(USER_ID_HEADER) {
            return Ok(Self(None));
        }
        let AuthenticatedUser(id) = AuthenticatedUser::from_request_parts(parts, state).await?;
        Ok(Self(Some(id)))
    }
}

/// JSON body that has passed its `validator` rules.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
        value.validate().map_err(|e| ApiError::invalid(e.to_string()))?;
        Ok(Self(value))
    }
}
