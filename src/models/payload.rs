//! Tool payloads: the full private view loaded from storage, and the
//! sanitized public projection served to anonymous viewers.
//!
//! The public types are the allow-list: a field that does not exist on
//! `PublicItem`/`PublicComment` cannot leak, whatever the source row
//! contains. `PublicPayload` is never persisted; it is recomputed on every
//! validate call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One groupable entity of a tool (a location, board, or room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

/// A comment as stored, including the author's private contact identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_name: String,
    /// Private; has no counterpart on the public types.
    pub author_email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub url: String,
    pub caption: Option<String>,
}

/// A tool item with everything the owner sees. The private-only fields
/// (assignee contact, cost estimate) never reach the public projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolItem {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub status: Option<String>,
    pub sort_order: i32,
    pub notes: Option<String>,
    pub assignee_email: Option<String>,
    pub cost_estimate_cents: Option<i64>,
    pub comments: Vec<Comment>,
    pub photos: Vec<PhotoRef>,
    pub hero_photo: Option<PhotoRef>,
}

/// Full private payload for one tool in one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolPayload {
    pub groups: Vec<GroupRef>,
    pub items: Vec<ToolItem>,
}

// ── Public projection ────────────────────────────────────────

/// Comment as served publicly: display name only, never contact data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicItem {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub status: Option<String>,
    pub sort_order: i32,
    /// Absent (not empty) when the link excludes notes, so renderers cannot
    /// show a stale empty box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub comments: Vec<PublicComment>,
    pub photos: Vec<PhotoRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_photo: Option<PhotoRef>,
}

/// The sanitized, scope-filtered projection served to anonymous viewers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PublicPayload {
    pub groups: Vec<GroupRef>,
    pub items: Vec<PublicItem>,
}
