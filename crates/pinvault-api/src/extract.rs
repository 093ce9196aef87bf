use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use pinvault_types::validation::{FieldErrors, Validate};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body that must decode and then pass `Validate`.
/// Decode failures are reported against the `body` field.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| FieldErrors::single("body", rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string counterpart of `ValidJson`.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| FieldErrors::single("query", rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
