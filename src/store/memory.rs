//! In-memory backend for the integration suite and local development.
//!
//! Mirrors the Postgres backend's observable behavior: exact-match secret
//! lookup (constant-time compare), idempotent revocation, newest-first
//! listings that include terminal tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::models::payload::ToolPayload;
use crate::models::project::{CurrentUser, Project, ProjectRole};
use crate::models::share_token::ShareToken;
use crate::store::{IdentityStore, ShareStore, ToolDataSource};
use crate::tools::ToolKey;

#[derive(Default)]
pub struct MemoryStore {
    tokens: DashMap<Uuid, ShareToken>,
    projects: DashMap<Uuid, Project>,
    sessions: DashMap<String, CurrentUser>,
    members: DashMap<(Uuid, Uuid), ProjectRole>,
    payloads: DashMap<(ToolKey, Uuid), ToolPayload>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_project(&self, project: Project) {
        self.projects.insert(project.id, project);
    }

    pub fn seed_session(&self, token: impl Into<String>, user: CurrentUser) {
        self.sessions.insert(token.into(), user);
    }

    pub fn seed_member(&self, project_id: Uuid, user_id: Uuid, role: ProjectRole) {
        self.members.insert((project_id, user_id), role);
    }

    pub fn seed_payload(&self, tool: ToolKey, project_id: Uuid, payload: ToolPayload) {
        self.payloads.insert((tool, project_id), payload);
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn insert_share_token(&self, token: &ShareToken) -> anyhow::Result<()> {
        self.tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn list_share_tokens(
        &self,
        tool: ToolKey,
        project_id: Uuid,
    ) -> anyhow::Result<Vec<ShareToken>> {
        let mut tokens: Vec<ShareToken> = self
            .tokens
            .iter()
            .filter(|t| t.tool == tool && t.project_id == project_id)
            .map(|t| t.clone())
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn revoke_share_token(
        &self,
        id: Uuid,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        if let Some(mut token) = self.tokens.get_mut(&id) {
            if token.project_id == project_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
            }
        }
        Ok(())
    }

    async fn lookup_share_token(&self, secret: &str) -> anyhow::Result<Option<ShareToken>> {
        Ok(self
            .tokens
            .iter()
            .find(|t| bool::from(t.secret.as_bytes().ct_eq(secret.as_bytes())))
            .map(|t| t.clone()))
    }

    async fn get_project(&self, id: Uuid) -> anyhow::Result<Option<Project>> {
        Ok(self.projects.get(&id).map(|p| p.clone()))
    }
}

#[async_trait]
impl ToolDataSource for MemoryStore {
    async fn load_payload(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<ToolPayload> {
        Ok(self
            .payloads
            .get(&(tool, project_id))
            .map(|p| p.clone())
            .unwrap_or_default())
    }

    async fn group_count(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<usize> {
        Ok(self
            .payloads
            .get(&(tool, project_id))
            .map(|p| p.groups.len())
            .unwrap_or(0))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn user_for_session(
        &self,
        session_token: &str,
    ) -> anyhow::Result<Option<CurrentUser>> {
        Ok(self.sessions.get(session_token).map(|u| u.clone()))
    }

    async fn project_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ProjectRole>> {
        Ok(self.members.get(&(project_id, user_id)).map(|r| *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::share_token::{Scope, ShareFlags, TokenState};

    fn issue(store: &MemoryStore, project_id: Uuid) -> ShareToken {
        let token = ShareToken::issue(
            ToolKey::FixList,
            project_id,
            ShareFlags {
                include_notes: true,
                include_comments: false,
                include_photos: false,
            },
            Scope::all(),
            Utc::now(),
        );
        tokio_test::block_on(store.insert_share_token(&token)).unwrap();
        token
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let store = MemoryStore::new();
        let token = issue(&store, Uuid::new_v4());

        let found = tokio_test::block_on(store.lookup_share_token(&token.secret)).unwrap();
        assert!(found.is_some());

        let prefix = &token.secret[..token.secret.len() - 1];
        assert!(tokio_test::block_on(store.lookup_share_token(prefix))
            .unwrap()
            .is_none());
        assert!(tokio_test::block_on(store.lookup_share_token(""))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        let token = issue(&store, project_id);

        let first = Utc::now();
        tokio_test::block_on(store.revoke_share_token(token.id, project_id, first)).unwrap();
        let later = first + chrono::Duration::hours(1);
        tokio_test::block_on(store.revoke_share_token(token.id, project_id, later)).unwrap();

        let stored = tokio_test::block_on(store.lookup_share_token(&token.secret))
            .unwrap()
            .unwrap();
        // second revoke did not move the timestamp
        assert_eq!(stored.revoked_at, Some(first));
        assert_eq!(stored.state(later), TokenState::Revoked);
    }

    #[test]
    fn test_revoke_ignores_wrong_project() {
        let store = MemoryStore::new();
        let token = issue(&store, Uuid::new_v4());

        tokio_test::block_on(store.revoke_share_token(token.id, Uuid::new_v4(), Utc::now()))
            .unwrap();

        let stored = tokio_test::block_on(store.lookup_share_token(&token.secret))
            .unwrap()
            .unwrap();
        assert!(stored.revoked_at.is_none());
    }

    #[test]
    fn test_list_includes_terminal_tokens_newest_first() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        let older = issue(&store, project_id);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = issue(&store, project_id);
        tokio_test::block_on(store.revoke_share_token(older.id, project_id, Utc::now())).unwrap();

        let listed =
            tokio_test::block_on(store.list_share_tokens(ToolKey::FixList, project_id)).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert!(listed[1].revoked_at.is_some());
    }
}
