//! HTTP middleware
//!
//! - CORS from [`CorsConfig`]
//! - Request tracing: one `request` span per call carrying method, path and
//!   client IP, closed with status and latency
//! - Token authentication ([`AuthUser`] extractor)

use axum::{
    extract::ConnectInfo,
    http::{header, Method, Request},
};
use std::{net::SocketAddr, time::Duration};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
    LatencyUnit,
};
use tracing::{Level, Span};

use crate::audit::client_ip;
use crate::config::CorsConfig;

pub mod auth;

pub use auth::{AuthUser, TokenError};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION])
        // the export filename travels in Content-Disposition
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600));

    // Credentials cannot be combined with a wildcard origin
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

/// Span factory for incoming requests
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_ip(request.headers(), peer).unwrap_or_default();

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            client = %client,
        )
    }
}

pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Micros),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    fn config(origins: &[&str]) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            allow_credentials: true,
        }
    }

    async fn preflight(cors: CorsLayer, origin: &str) -> Option<String> {
        let app = Router::new().route("/books", get(|| async { "ok" })).layer(cors);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/books")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origins() {
        let layer = cors_layer(&config(&["https://library.example.org"]));
        assert_eq!(
            preflight(layer.clone(), "https://library.example.org").await.as_deref(),
            Some("https://library.example.org")
        );
        assert_eq!(preflight(layer, "https://elsewhere.example").await, None);
    }

    #[tokio::test]
    async fn test_cors_wildcard() {
        let layer = cors_layer(&config(&["*"]));
        assert_eq!(preflight(layer, "https://anywhere.example").await.as_deref(), Some("*"));
    }

    #[test]
    fn test_request_span_builds_without_connect_info() {
        let request = Request::get("/api/v1/books")
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        let _span = RequestSpan.make_span(&request);
    }
}
