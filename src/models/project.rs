use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project row, as loaded from the projects table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Role a user holds on a project. Matches the `role` column in the
/// `project_members` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,
    Editor,
    Viewer,
}

impl ProjectRole {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Some(ProjectRole::Owner),
            "editor" => Some(ProjectRole::Editor),
            "viewer" => Some(ProjectRole::Viewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Editor => "editor",
            ProjectRole::Viewer => "viewer",
        }
    }
}

/// Authenticated caller, resolved from the session header by the
/// session middleware and attached as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(ProjectRole::from_str("owner"), Some(ProjectRole::Owner));
        assert_eq!(ProjectRole::from_str("Owner"), Some(ProjectRole::Owner));
        assert_eq!(ProjectRole::from_str("editor"), Some(ProjectRole::Editor));
        assert_eq!(ProjectRole::from_str("viewer"), Some(ProjectRole::Viewer));
        assert_eq!(ProjectRole::from_str("admin"), None);
    }
}
