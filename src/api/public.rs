//! Public resolution endpoints. Unauthenticated by design; the token is
//! the authorization. Every invalid outcome (unknown tool, never-issued,
//! expired, revoked) produces the same response, with no payload fields.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::errors::{AppError, INVALID_LINK_MESSAGE};
use crate::models::payload::PublicPayload;
use crate::models::share_token::Scope;
use crate::share::validate::{validate, PublicShareView};
use crate::tools::ToolKey;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicShareResponse {
    pub project_name: String,
    pub include_notes: bool,
    pub include_comments: bool,
    pub include_photos: bool,
    pub scope: Scope,
    pub payload: PublicPayload,
}

impl From<PublicShareView> for PublicShareResponse {
    fn from(view: PublicShareView) -> Self {
        PublicShareResponse {
            project_name: view.project_name,
            include_notes: view.flags.include_notes,
            include_comments: view.flags.include_comments,
            include_photos: view.flags.include_photos,
            scope: view.scope,
            payload: view.payload,
        }
    }
}

async fn resolve(
    state: &AppState,
    tool: &str,
    secret: &str,
) -> Result<PublicShareView, AppError> {
    // An unknown tool key is indistinguishable from an invalid token.
    let tool = ToolKey::parse(tool).ok_or(AppError::InvalidToken)?;
    validate(state.store.as_ref(), tool, secret, Utc::now()).await
}

/// GET /api/share/:tool/:secret — resolve a link to its sanitized payload.
pub async fn resolve_share(
    State(state): State<Arc<AppState>>,
    Path((tool, secret)): Path<(String, String)>,
) -> Result<Json<PublicShareResponse>, AppError> {
    let view = resolve(&state, &tool, &secret).await?;
    Ok(Json(view.into()))
}

/// GET /share/:tool/:secret — the public page shell. Embeds the resolved
/// view as JSON for the tool-specific client renderer, or serves the
/// generic invalid page.
pub async fn share_page(
    State(state): State<Arc<AppState>>,
    Path((tool, secret)): Path<(String, String)>,
) -> Response {
    match resolve(&state, &tool, &secret).await {
        Ok(view) => {
            let response: PublicShareResponse = view.into();
            render_share_page(&response)
        }
        Err(AppError::InvalidToken) => invalid_page(),
        Err(e) => {
            tracing::error!("share page resolution failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<!doctype html><title>Error</title><h1>Something went wrong</h1>".to_string()),
            )
                .into_response()
        }
    }
}

fn render_share_page(response: &PublicShareResponse) -> Response {
    let data = match serde_json::to_string(response) {
        Ok(json) => json.replace("</", "<\\/"),
        Err(e) => {
            tracing::error!("share page serialization failed: {}", e);
            return invalid_page();
        }
    };

    let html = format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"robots\" content=\"noindex\">\n\
         <title>{title} — shared view</title>\n</head>\n<body>\n\
         <div id=\"share-root\"></div>\n\
         <script id=\"share-data\" type=\"application/json\">{data}</script>\n\
         </body>\n</html>\n",
        title = html_escape(&response.project_name),
    );

    Html(html).into_response()
}

fn invalid_page() -> Response {
    let html = format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{msg}</title>\n</head>\n<body>\n<h1>{msg}</h1>\n\
         <p>This link is no longer available. Ask the project owner for a new one.</p>\n\
         </body>\n</html>\n",
        msg = INVALID_LINK_MESSAGE,
    );
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("A & B <i>"), "A &amp; B &lt;i&gt;");
    }
}
