//! Persistence traits and backends.
//!
//! Handlers and the token validator are written against the narrow traits
//! here, so the integration suite can drive the real router over the
//! in-memory backend while production runs on Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::payload::ToolPayload;
use crate::models::project::{CurrentUser, Project, ProjectRole};
use crate::models::share_token::ShareToken;
use crate::tools::ToolKey;

pub mod memory;
pub mod postgres;

/// Share-token persistence and lifecycle.
///
/// Tokens are never deleted; `revoke` is the only mutation and is
/// idempotent. Lookup is exact-match only, no prefix or fuzzy matching.
#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn insert_share_token(&self, token: &ShareToken) -> anyhow::Result<()>;

    /// All tokens for one tool+project, newest first, regardless of state;
    /// the management UI shows expired/revoked history.
    async fn list_share_tokens(
        &self,
        tool: ToolKey,
        project_id: Uuid,
    ) -> anyhow::Result<Vec<ShareToken>>;

    /// Sets `revoked_at = now` if not already set. Revoking twice is a
    /// no-op, not an error. The project id guards cross-project revocation.
    async fn revoke_share_token(
        &self,
        id: Uuid,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn lookup_share_token(&self, secret: &str) -> anyhow::Result<Option<ShareToken>>;

    async fn get_project(&self, id: Uuid) -> anyhow::Result<Option<Project>>;
}

/// Boundary to the per-tool data services: the full private payload and the
/// groupable-entity catalog the scope picker and risk gate need.
#[async_trait]
pub trait ToolDataSource: Send + Sync {
    async fn load_payload(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<ToolPayload>;

    async fn group_count(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<usize>;
}

/// Boundary to the identity/session provider and the project-access table.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn user_for_session(&self, session_token: &str)
        -> anyhow::Result<Option<CurrentUser>>;

    async fn project_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ProjectRole>>;
}

/// Everything the application state needs from a backend.
pub trait Store: ShareStore + ToolDataSource + IdentityStore {}

impl<T: ShareStore + ToolDataSource + IdentityStore> Store for T {}
