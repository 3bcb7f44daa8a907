//! Token validation: resolves an opaque secret into a composed public view.
//!
//! Safe to call with arbitrary, possibly malicious secrets: the only
//! failure that leaves this module for a bad token is the single generic
//! [`AppError::InvalidToken`], whether the token never existed, expired,
//! was revoked, or belongs to a different tool. Side-effect-free; the
//! public view is recomputed on every call, never cached or persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::payload::PublicPayload;
use crate::models::share_token::{Scope, ShareFlags};
use crate::share::{sanitize, scope};
use crate::store::{ShareStore, Store, ToolDataSource};
use crate::tools::ToolKey;

/// Everything the public renderer needs for one resolved link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicShareView {
    pub project_name: String,
    pub flags: ShareFlags,
    pub scope: Scope,
    pub payload: PublicPayload,
}

/// Resolves `secret` for `tool` at time `now`.
///
/// Lookup is exact-match; the token must be live and minted for this tool.
/// On success the current payload is loaded, scope-filtered, and sanitized.
pub async fn validate(
    store: &dyn Store,
    tool: ToolKey,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<PublicShareView, AppError> {
    let Some(token) = store.lookup_share_token(secret).await? else {
        return Err(AppError::InvalidToken);
    };

    if token.tool != tool || !token.is_live(now) {
        return Err(AppError::InvalidToken);
    }

    let project = store
        .get_project(token.project_id)
        .await?
        .ok_or(AppError::InvalidToken)?;

    let payload = store.load_payload(tool, token.project_id).await?;
    let visible = scope::resolve(&token.scope, payload);
    let public = sanitize::sanitize(&visible, &token.flags);

    Ok(PublicShareView {
        project_name: project.name,
        flags: token.flags,
        scope: token.scope,
        payload: public,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::models::payload::{GroupRef, ToolItem, ToolPayload};
    use crate::models::project::Project;
    use crate::models::share_token::ShareToken;
    use crate::store::memory::MemoryStore;

    fn flags_all() -> ShareFlags {
        ShareFlags {
            include_notes: true,
            include_comments: true,
            include_photos: true,
        }
    }

    fn item(group_id: Uuid) -> ToolItem {
        ToolItem {
            id: Uuid::new_v4(),
            group_id,
            title: "Paint touch-up".into(),
            status: Some("open".into()),
            sort_order: 0,
            notes: Some("hallway scuffs".into()),
            assignee_email: None,
            cost_estimate_cents: None,
            comments: vec![],
            photos: vec![],
            hero_photo: None,
        }
    }

    fn seeded_store() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        store.seed_project(Project {
            id: project_id,
            name: "Maple St Renovation".into(),
            created_at: Utc::now(),
        });
        let group = Uuid::new_v4();
        store.seed_payload(
            ToolKey::FixList,
            project_id,
            ToolPayload {
                groups: vec![GroupRef {
                    id: group,
                    name: "Hallway".into(),
                }],
                items: vec![item(group)],
            },
        );
        (store, project_id)
    }

    #[tokio::test]
    async fn test_validate_succeeds_iff_live() {
        let (store, project_id) = seeded_store();
        let now = Utc::now();
        let token = ShareToken::issue(ToolKey::FixList, project_id, flags_all(), Scope::all(), now);
        store.insert_share_token(&token).await.unwrap();

        let view = validate(&store, ToolKey::FixList, &token.secret, now)
            .await
            .unwrap();
        assert_eq!(view.project_name, "Maple St Renovation");
        assert_eq!(view.payload.items.len(), 1);

        // expired
        let after_expiry = token.expires_at + Duration::seconds(1);
        let result = validate(&store, ToolKey::FixList, &token.secret, after_expiry).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));

        // revoked, even though expiry has not passed
        store
            .revoke_share_token(token.id, project_id, now)
            .await
            .unwrap();
        let result = validate(&store, ToolKey::FixList, &token.secret, now).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_never_issued_secret_is_generic_invalid() {
        let (store, _) = seeded_store();
        let result = validate(
            &store,
            ToolKey::FixList,
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            Utc::now(),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_token_is_bound_to_its_tool() {
        let (store, project_id) = seeded_store();
        let now = Utc::now();
        let token = ShareToken::issue(ToolKey::FixList, project_id, flags_all(), Scope::all(), now);
        store.insert_share_token(&token).await.unwrap();

        let result = validate(&store, ToolKey::MoodBoards, &token.secret, now).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_scope_and_flags_are_applied() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        store.seed_project(Project {
            id: project_id,
            name: "Loft".into(),
            created_at: Utc::now(),
        });
        let kept = Uuid::new_v4();
        let dropped = Uuid::new_v4();
        store.seed_payload(
            ToolKey::DecisionTracker,
            project_id,
            ToolPayload {
                groups: vec![
                    GroupRef {
                        id: kept,
                        name: "Kitchen".into(),
                    },
                    GroupRef {
                        id: dropped,
                        name: "Bath".into(),
                    },
                ],
                items: vec![item(kept), item(dropped)],
            },
        );

        let now = Utc::now();
        let token = ShareToken::issue(
            ToolKey::DecisionTracker,
            project_id,
            ShareFlags {
                include_notes: false,
                include_comments: true,
                include_photos: true,
            },
            Scope::selected([kept]),
            now,
        );
        store.insert_share_token(&token).await.unwrap();

        let view = validate(&store, ToolKey::DecisionTracker, &token.secret, now)
            .await
            .unwrap();
        assert_eq!(view.payload.groups.len(), 1);
        assert_eq!(view.payload.groups[0].id, kept);
        assert_eq!(view.payload.items.len(), 1);
        assert!(view.payload.items[0].notes.is_none());
    }
}
