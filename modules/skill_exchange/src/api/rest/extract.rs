use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};
use axum::Json;
use modkit::api::problem::{internal_error, ProblemResponse};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::rest::error::{map_domain_error, problem, ProblemScope};
use crate::domain::error::DomainError;
use crate::domain::ports::SessionGuard;

impl<S> FromRequestParts<S> for ProblemScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ProblemScope::of(&parts.uri, &parts.headers))
    }
}

/// The caller, resolved from `Authorization: Bearer <token>` by the
/// [`SessionGuard`] installed on the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(guard) = parts.extensions.get::<Arc<dyn SessionGuard>>().cloned() else {
            tracing::error!("SessionGuard extension missing from router");
            return Err(internal_error("authentication is not configured"));
        };
        let scope = || ProblemScope::of(&parts.uri, &parts.headers);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| map_domain_error(&DomainError::Unauthorized, &scope()))?;
        guard
            .resolve(token)
            .map(AuthenticatedUser)
            .map_err(|e| map_domain_error(&e, &scope()))
    }
}

/// `Json<T>` whose rejections render as `InvalidInput` problems.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let scope = ProblemScope::of(req.uri(), req.headers());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ProblemResponse(problem(
                StatusCode::BAD_REQUEST,
                "InvalidInput",
                "Invalid input",
                rejection.body_text(),
                &scope,
            ))),
        }
    }
}

/// Parses a required id field, naming the field on failure.
pub fn parse_id(field: &str, raw: Option<&str>) -> Result<Uuid, DomainError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::invalid_input(field, "is required"))?;
    Uuid::parse_str(raw).map_err(|_| DomainError::invalid_input(field, "is not a valid id"))
}
