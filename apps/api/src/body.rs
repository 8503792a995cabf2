//! JSON body extractors whose rejections use the `AppError` envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// `axum::Json` with malformed bodies and unknown option values reported as
/// `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// A body that may be left out entirely. An empty body yields `T::default()`;
/// anything else must parse, so a bad override is refused rather than ignored.
#[derive(Debug)]
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))
    }
}
