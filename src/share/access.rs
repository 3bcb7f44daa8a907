//! Authorization checks for the sharing surfaces.
//!
//! Share-token management (create, list, revoke, preview) is owner-only.
//! The export/print path is open to any collaborator. Anonymous viewers
//! never pass through here; they only reach the public resolution
//! endpoint, which authorizes by token alone.
//!
//! The management UI also hides the affordance for non-owners; the checks
//! here are the server-side half of that (UI hiding plus rejection).

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::ProjectRole;

/// Pure authorization predicates over an already-resolved project role.
pub struct AccessGate;

impl AccessGate {
    /// Owner-only: create, list, and revoke share tokens.
    pub fn can_manage(role: ProjectRole) -> bool {
        matches!(role, ProjectRole::Owner)
    }

    /// Any collaborator may use the export/print path.
    pub fn can_export(_role: ProjectRole) -> bool {
        true
    }
}

/// Enforces the management check in API handlers; `role` is `None` when the
/// caller is not a collaborator on the project at all.
pub fn require_manage(
    role: Option<ProjectRole>,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    match role {
        Some(role) if AccessGate::can_manage(role) => Ok(()),
        Some(role) => {
            tracing::warn!(
                %project_id,
                %user_id,
                role = role.as_str(),
                "share-token management denied: owner role required"
            );
            Err(AppError::PermissionDenied {
                reason: "only the project owner can manage share links".to_string(),
            })
        }
        None => {
            tracing::warn!(
                %project_id,
                %user_id,
                "share-token management denied: caller is not a collaborator"
            );
            Err(AppError::PermissionDenied {
                reason: "you do not have access to this project".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_can_manage() {
        assert!(AccessGate::can_manage(ProjectRole::Owner));
        assert!(!AccessGate::can_manage(ProjectRole::Editor));
        assert!(!AccessGate::can_manage(ProjectRole::Viewer));
    }

    #[test]
    fn test_every_collaborator_can_export() {
        assert!(AccessGate::can_export(ProjectRole::Owner));
        assert!(AccessGate::can_export(ProjectRole::Editor));
        assert!(AccessGate::can_export(ProjectRole::Viewer));
    }

    #[test]
    fn test_require_manage_accepts_owner() {
        let result = require_manage(Some(ProjectRole::Owner), Uuid::new_v4(), Uuid::new_v4());
        assert!(result.is_ok());
    }

    #[test]
    fn test_require_manage_rejects_editor_and_viewer() {
        for role in [ProjectRole::Editor, ProjectRole::Viewer] {
            let result = require_manage(Some(role), Uuid::new_v4(), Uuid::new_v4());
            assert!(matches!(result, Err(AppError::PermissionDenied { .. })));
        }
    }

    #[test]
    fn test_require_manage_rejects_non_collaborator() {
        let result = require_manage(None, Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(result, Err(AppError::PermissionDenied { .. })));
    }
}
