//! Query string extraction

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::Response,
};
use serde::de::DeserializeOwned;

use crate::api::response::ErrorResponse;

/// [`Query`] whose rejection uses the API error envelope
///
/// A non-numeric `page` or `limit` is answered with `400 VALIDATION_ERROR`
/// like every other invalid parameter, not with axum's plain-text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ErrorResponse::new("VALIDATION_ERROR", rejection.body_text())
                .into_response_with(StatusCode::BAD_REQUEST)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::PaginationParams;
    use axum::http::Request;

    async fn extract(uri: &str) -> Result<PaginationParams, Response> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ValidatedQuery::<PaginationParams>::from_request_parts(&mut parts, &())
            .await
            .map(|ValidatedQuery(params)| params)
    }

    #[tokio::test]
    async fn test_parses_query() {
        let params = extract("/?page=3&limit=20").await.unwrap();
        assert_eq!(params, PaginationParams::new(Some(3), Some(20)));
    }

    #[tokio::test]
    async fn test_malformed_query_uses_error_envelope() {
        let response = extract("/?page=two").await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
