use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Dashboards are served from other origins; every origin may call the gateway.
pub fn dashboard_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_origin(Any)
}
