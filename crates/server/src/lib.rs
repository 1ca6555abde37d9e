//! Advisor Site contact server library.
//!
//! This crate provides the submission handler as a library, allowing it to be
//! tested and embedded. [`app`] builds the full router for a given state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router without rate limiting.
pub fn app(state: AppState) -> Router {
    build(state, routes::contact_routes())
}

/// Build the application router with per-IP rate limiting on the contact
/// routes.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// clients without proxy headers can still be keyed by peer address.
pub fn rate_limited_app(state: AppState) -> Router {
    build(
        state,
        routes::contact_routes().layer(middleware::contact_rate_limiter()),
    )
}

fn build(state: AppState, contact: Router<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(contact)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(middleware::cors_layer())
        .with_state(state)
}
