use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::store::IdentityStore;
use crate::AppState;

pub mod handlers;
pub mod public;

/// Build the management API router. All routes are relative — the caller
/// mounts this under `/api`. Every route requires a resolvable session;
/// per-project ownership is enforced in the handlers.
pub fn management_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/tools/:tool/share-token",
            post(handlers::create_share_token)
                .get(handlers::list_share_tokens)
                .delete(handlers::revoke_share_token),
        )
        .route(
            "/tools/:tool/share-token/preview",
            post(handlers::preview_share_token),
        )
        .layer(middleware::from_fn_with_state(state, session_auth))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

/// Public resolution routes. No auth; the token is the authorization.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/share/:tool/:secret", get(public::resolve_share))
        .route("/share/:tool/:secret", get(public::share_page))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: resolves `X-Session-Token` (or a Bearer token) through the
/// identity store and attaches the caller as a request extension. Returns
/// 401 if the session is missing or unknown.
async fn session_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_token = req
        .headers()
        .get("x-session-token")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    let Some(session_token) = session_token else {
        tracing::warn!("management API: missing X-Session-Token header");
        return Err(AppError::Unauthorized);
    };

    match state.store.user_for_session(session_token).await? {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            tracing::warn!("management API: unknown or expired session");
            Err(AppError::Unauthorized)
        }
    }
}
