//! Validated JSON body extractor
//!
//! Handlers only ever see records that passed field validation. Bodies that
//! are not JSON at all and bodies with bad fields are both answered with 422
//! before the handler runs, so no rejected input reaches storage or the model.

use antistress_common::validation::Validate;
use antistress_common::FieldError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

/// A request body validated into `T`
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().path().to_string();

        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!("{}: unreadable request body: {}", uri, rejection.body_text());
                ApiError::Validation(
                    FieldError::body(rejection.body_text(), "value_error.jsondecode").into(),
                )
            })?;

        let record = T::validate(&payload).map_err(|errors| {
            warn!("{}: {}", uri, errors);
            ApiError::Validation(errors)
        })?;

        Ok(ValidatedJson(record))
    }
}
