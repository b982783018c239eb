use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;

use crate::auth::{CredentialStore, registry};

pub mod error;
pub(crate) mod handlers;
pub mod session;
pub mod state;
pub mod views;
// OpenAPI document for the form and health endpoints.
mod openapi;

pub use openapi::openapi;
pub use state::{AuthConfig, AuthState};

use self::session::{HOME_PATH, LOGIN_PATH};

/// Build the application router around a shared auth state.
#[must_use]
pub fn router(auth_state: Arc<AuthState>) -> Router {
    let protected = Router::new()
        .route(HOME_PATH, get(handlers::root::index))
        .route_layer(middleware::from_fn(session::require_session));

    let public = Router::new()
        .route(
            LOGIN_PATH,
            get(handlers::login::login_page).post(handlers::login::login),
        )
        .route_layer(middleware::from_fn(session::attach_session));

    Router::new()
        .merge(protected)
        .merge(public)
        .route("/logout", post(handlers::logout::logout))
        .route("/health", get(handlers::health::health))
        // Only covers routes registered above.
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, credentials: CredentialStore, auth_config: AuthConfig) -> Result<()> {
    let auth_state = Arc::new(AuthState::new(credentials, auth_config));

    // Expired sessions are also dropped lazily on lookup; the sweeper bounds memory.
    let sweeper = auth_state.config().session_ttl().map(|_| {
        registry::spawn_sweeper(
            Arc::clone(auth_state.sessions()),
            auth_state.config().sweep_interval(),
        )
    });

    let app = router(auth_state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
