use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::CurrentUser;
use crate::models::share_token::{Scope, ShareFlags, ShareToken, TokenState};
use crate::share::{access, risk};
use crate::store::{IdentityStore, ShareStore, ToolDataSource};
use crate::tools::ToolKey;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub project_id: Uuid,
}

/// Scope as submitted by the management UI. The mode is validated by hand
/// so a bad value yields a field-level 400 instead of a body-parse error.
#[derive(Deserialize)]
pub struct ScopeSpec {
    pub mode: String,
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareTokenRequest {
    pub include_notes: bool,
    pub include_comments: bool,
    pub include_photos: bool,
    pub scope: ScopeSpec,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareTokenResponse {
    pub token: String,
    pub token_id: Uuid,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTokenEntry {
    pub token_id: Uuid,
    pub url: String,
    pub state: TokenState,
    pub scope: Scope,
    pub include_notes: bool,
    pub include_comments: bool,
    pub include_photos: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ListShareTokensResponse {
    pub tokens: Vec<ShareTokenEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeShareTokenRequest {
    pub token_id: Uuid,
}

// ── Helpers ──────────────────────────────────────────────────

fn parse_tool(segment: &str) -> Result<ToolKey, AppError> {
    ToolKey::parse(segment).ok_or_else(|| AppError::Validation {
        field: "tool",
        message: format!("unknown tool {:?}", segment),
    })
}

fn parse_scope(spec: ScopeSpec) -> Result<Scope, AppError> {
    match spec.mode.as_str() {
        "all" => Ok(Scope::all()),
        "selected" => Ok(Scope::selected(spec.ids)),
        other => Err(AppError::Validation {
            field: "scope.mode",
            message: format!("expected \"all\" or \"selected\", got {:?}", other),
        }),
    }
}

fn share_url(state: &AppState, tool: ToolKey, secret: &str) -> String {
    format!(
        "{}/share/{}/{}",
        state.config.public_url.trim_end_matches('/'),
        tool,
        secret
    )
}

async fn require_owner(
    state: &AppState,
    project_id: Uuid,
    user: &CurrentUser,
) -> Result<(), AppError> {
    let role = state.store.project_role(project_id, user.id).await?;
    access::require_manage(role, project_id, user.id)
}

fn entry(state: &AppState, token: ShareToken, now: DateTime<Utc>) -> ShareTokenEntry {
    ShareTokenEntry {
        url: share_url(state, token.tool, &token.secret),
        state: token.state(now),
        token_id: token.id,
        scope: token.scope,
        include_notes: token.flags.include_notes,
        include_comments: token.flags.include_comments,
        include_photos: token.flags.include_photos,
        created_at: token.created_at,
        expires_at: token.expires_at,
        revoked_at: token.revoked_at,
    }
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/tools/:tool/share-token — mint a new public link (owner only).
pub async fn create_share_token(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Query(q): Query<ProjectQuery>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateShareTokenRequest>,
) -> Result<(StatusCode, Json<CreateShareTokenResponse>), AppError> {
    let tool = parse_tool(&tool)?;
    require_owner(&state, q.project_id, &user).await?;
    let scope = parse_scope(payload.scope)?;

    let flags = ShareFlags {
        include_notes: payload.include_notes,
        include_comments: payload.include_comments,
        include_photos: payload.include_photos,
    };

    let token = ShareToken::issue(tool, q.project_id, flags, scope, Utc::now());
    state.store.insert_share_token(&token).await?;

    tracing::info!(
        tool = %tool,
        project_id = %q.project_id,
        token_id = %token.id,
        "share token created"
    );

    let response = CreateShareTokenResponse {
        url: share_url(&state, tool, &token.secret),
        token: token.secret,
        token_id: token.id,
        expires_at: token.expires_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/tools/:tool/share-token — owner management listing, including
/// expired and revoked history.
pub async fn list_share_tokens(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Query(q): Query<ProjectQuery>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ListShareTokensResponse>, AppError> {
    let tool = parse_tool(&tool)?;
    require_owner(&state, q.project_id, &user).await?;

    let now = Utc::now();
    let tokens = state
        .store
        .list_share_tokens(tool, q.project_id)
        .await?
        .into_iter()
        .map(|t| entry(&state, t, now))
        .collect();

    Ok(Json(ListShareTokensResponse { tokens }))
}

/// DELETE /api/tools/:tool/share-token — idempotent revoke (owner only).
pub async fn revoke_share_token(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Query(q): Query<ProjectQuery>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RevokeShareTokenRequest>,
) -> Result<StatusCode, AppError> {
    parse_tool(&tool)?;
    require_owner(&state, q.project_id, &user).await?;

    state
        .store
        .revoke_share_token(payload.token_id, q.project_id, Utc::now())
        .await?;

    tracing::info!(
        project_id = %q.project_id,
        token_id = %payload.token_id,
        "share token revoked"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tools/:tool/share-token/preview — risk classification for the
/// creation dialog. Informational only; creation never re-derives it.
pub async fn preview_share_token(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Query(q): Query<ProjectQuery>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateShareTokenRequest>,
) -> Result<Json<risk::RiskAssessment>, AppError> {
    let tool = parse_tool(&tool)?;
    require_owner(&state, q.project_id, &user).await?;
    let scope = parse_scope(payload.scope)?;

    let flags = ShareFlags {
        include_notes: payload.include_notes,
        include_comments: payload.include_comments,
        include_photos: payload.include_photos,
    };

    let group_count = state.store.group_count(tool, q.project_id).await?;
    Ok(Json(risk::classify(&flags, scope.mode, group_count)))
}
