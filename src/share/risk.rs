//! Risky-share classification.
//!
//! A link that discloses free-text notes or photos across an unscoped
//! project with three or more groups gets the stronger confirmation ritual:
//! the creation UI must require the caller to type [`CONFIRMATION_WORD`]
//! exactly (case-sensitive) before enabling the create action. Everything
//! else gets a plain acknowledgment checkbox.
//!
//! This is a UX-level gate: the create endpoint does not re-derive or
//! enforce it. The management UI fetches the classification through the
//! preview endpoint.

use serde::Serialize;

use crate::models::share_token::{ScopeMode, ShareFlags};

/// Literal the caller must type for a risky share.
pub const CONFIRMATION_WORD: &str = "SHARE";

/// Minimum group count for the unscoped-breadth half of the risk test.
pub const RISKY_GROUP_THRESHOLD: usize = 3;

/// Which confirmation ritual creation requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Confirmation {
    /// Simple acknowledgment checkbox.
    Checkbox,
    /// Exact, case-sensitive literal the caller must type.
    TypedWord { word: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub risky: bool,
    pub confirmation: Confirmation,
}

/// Classifies a candidate link configuration.
///
/// `risky = (notes || photos) && scope is all && group_count >= 3`.
/// Comments alone never trip the gate; a narrowed scope never trips it.
pub fn classify(flags: &ShareFlags, mode: ScopeMode, group_count: usize) -> RiskAssessment {
    let risky = (flags.include_notes || flags.include_photos)
        && mode == ScopeMode::All
        && group_count >= RISKY_GROUP_THRESHOLD;

    RiskAssessment {
        risky,
        confirmation: if risky {
            Confirmation::TypedWord {
                word: CONFIRMATION_WORD,
            }
        } else {
            Confirmation::Checkbox
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(notes: bool, comments: bool, photos: bool) -> ShareFlags {
        ShareFlags {
            include_notes: notes,
            include_comments: comments,
            include_photos: photos,
        }
    }

    #[test]
    fn test_notes_all_three_groups_is_risky() {
        let result = classify(&flags(true, false, false), ScopeMode::All, 3);
        assert!(result.risky);
        assert_eq!(
            result.confirmation,
            Confirmation::TypedWord { word: "SHARE" }
        );
    }

    #[test]
    fn test_photos_alone_is_risky_when_broad() {
        assert!(classify(&flags(false, false, true), ScopeMode::All, 5).risky);
    }

    #[test]
    fn test_comments_alone_is_not_risky() {
        let result = classify(&flags(false, true, false), ScopeMode::All, 5);
        assert!(!result.risky);
        assert_eq!(result.confirmation, Confirmation::Checkbox);
    }

    #[test]
    fn test_redacted_broad_share_is_not_risky() {
        assert!(!classify(&flags(false, false, false), ScopeMode::All, 5).risky);
    }

    #[test]
    fn test_selected_scope_is_not_risky() {
        assert!(!classify(&flags(true, true, true), ScopeMode::Selected, 5).risky);
    }

    #[test]
    fn test_below_group_threshold_is_not_risky() {
        assert!(!classify(&flags(true, false, true), ScopeMode::All, 2).risky);
        assert!(classify(&flags(true, false, true), ScopeMode::All, 3).risky);
    }
}
