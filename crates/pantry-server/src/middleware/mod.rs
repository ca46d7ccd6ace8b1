//! HTTP middleware for the pantry server
//!
//! - CORS, including the gateway identity headers
//! - Request tracing
//! - Request identity extractors ([`auth`])
//!
//! Action logging lives with the rest of the audit pipeline in
//! [`crate::audit::AuditLayer`].

use axum::http::{header, HeaderName, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;

pub mod auth;

use auth::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER, USER_PHONE_HEADER, USER_ROLE_HEADER};

/// Create CORS layer from configuration
///
/// Credentials are only allowed for an explicit origin list; a wildcard
/// origin never carries credentials.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_NAME_HEADER),
            HeaderName::from_static(USER_EMAIL_HEADER),
            HeaderName::from_static(USER_PHONE_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}

/// Create tracing/logging layer
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn config(origins: &[&str], allow_credentials: bool) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
            allow_credentials,
        }
    }

    async fn preflight(layer: CorsLayer, origin: &str) -> axum::http::Response<Body> {
        let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-user-id")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_identity_headers() {
        let layer = cors_layer(&config(&["http://localhost:3000"], true));
        let response = preflight(layer, "http://localhost:3000").await;

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
        assert!(allowed.contains("x-user-id"));
    }

    #[tokio::test]
    async fn test_cors_wildcard_drops_credentials() {
        let layer = cors_layer(&config(&["*"], true));
        let response = preflight(layer, "https://kitchen.example").await;

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
