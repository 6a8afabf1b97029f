use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::get_current_user::get_current_user;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register_user::register_user;
use super::handlers::update_account::update_account;
use super::middleware::authenticate;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub session_service: Arc<dyn SessionServicePort>,
    pub token_issuer: Arc<TokenIssuer>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    session_service: Arc<dyn SessionServicePort>,
    token_issuer: Arc<TokenIssuer>,
    cors: CorsLayer,
) -> Router {
    let state = AppState {
        user_service,
        session_service,
        token_issuer,
    };

    let public_routes = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token));

    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(get_current_user))
        .route("/update-account", patch(update_account))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Headers are left out of the span: they carry session cookies.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let users = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api/v1/users", users)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// CORS policy for the HTTP surface.
///
/// With an origin, only that origin may call and cookies are allowed to
/// travel. Without one, any origin may call but credentials are not shared.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PATCH])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        None => CorsLayer::permissive(),
    }
}
