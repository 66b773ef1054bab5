//! Identity extractors

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use super::Identity;
use crate::http::error::ApiError;

fn identity(parts: &Parts) -> Identity {
    parts
        .extensions
        .get::<Identity>()
        .copied()
        .unwrap_or(Identity::Anonymous)
}

/// Authenticated caller; rejects anonymous requests with 401
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Uuid);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(parts)
            .user_id()
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Caller if one was resolved, otherwise `None`
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<Uuid>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity(parts).user_id()))
    }
}
