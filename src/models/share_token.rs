//! Share token model and lifecycle predicates.
//!
//! A share token grants anonymous, read-only access to one tool's public
//! view until it expires or is revoked. Every field except `revoked_at` is
//! immutable after creation; tokens are never deleted, so owners keep a
//! full history of terminal links.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::ToolKey;

/// Fixed time-to-live for every share token. Enforced server-side on every
/// creation path (API and CLI); the expiry shown in UI copy is the same
/// value the validator checks.
pub const SHARE_TOKEN_TTL_DAYS: i64 = 14;

/// Which subset of a tool's groupable entities a link exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    All,
    Selected,
}

/// Scope of one share link. `ids` is meaningful only in `Selected` mode and is
/// evaluated against the current collection at view time, not a frozen
/// snapshot, so entities deleted after creation silently vanish from views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub mode: ScopeMode,
    #[serde(default)]
    pub ids: HashSet<Uuid>,
}

impl Scope {
    pub fn all() -> Self {
        Scope {
            mode: ScopeMode::All,
            ids: HashSet::new(),
        }
    }

    pub fn selected(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Scope {
            mode: ScopeMode::Selected,
            ids: ids.into_iter().collect(),
        }
    }
}

/// The three coarse content-inclusion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareFlags {
    pub include_notes: bool,
    pub include_comments: bool,
    pub include_photos: bool,
}

/// Lifecycle state, derived at read time. `Expired` is a computed predicate
/// (`now >= expires_at`), never a stored transition, so no sweep job exists.
/// `Revoked` and `Expired` are terminal; revocation wins over expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    Active,
    Expired,
    Revoked,
}

impl TokenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenState::Active => "active",
            TokenState::Expired => "expired",
            TokenState::Revoked => "revoked",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareToken {
    pub id: Uuid,
    pub tool: ToolKey,
    pub project_id: Uuid,
    /// Opaque, unguessable secret; the path segment of the public URL.
    pub secret: String,
    pub scope: Scope,
    pub flags: ShareFlags,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ShareToken {
    /// Issues a new active token. `expires_at` is always `now` + the fixed
    /// TTL; callers cannot choose a different lifetime.
    pub fn issue(
        tool: ToolKey,
        project_id: Uuid,
        flags: ShareFlags,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Self {
        ShareToken {
            id: Uuid::new_v4(),
            tool,
            project_id,
            secret: generate_secret(),
            scope,
            flags,
            created_at: now,
            expires_at: now + Duration::days(SHARE_TOKEN_TTL_DAYS),
            revoked_at: None,
        }
    }

    /// Derives the lifecycle state at `now`. A revoked token stays revoked
    /// regardless of `expires_at`.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked_at.is_some() {
            TokenState::Revoked
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == TokenState::Active
    }
}

/// Generates a share secret: 32 bytes of OS randomness, base64url without
/// padding (43 chars, URL-safe).
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
