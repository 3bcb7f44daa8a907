//! Scope resolution: computes the visible subset of a tool's payload.
//!
//! Pure and total. Selection filters by each item's parent group id against
//! the ids recorded on the token; ids referencing since-deleted groups are
//! simply absent from the current collection and contribute nothing.

use crate::models::payload::ToolPayload;
use crate::models::share_token::{Scope, ScopeMode};

/// Filters `payload` down to what `scope` exposes.
///
/// `All` is the identity transform. `Selected` retains only groups and
/// items whose group id is in `scope.ids`; an empty id set yields an empty
/// payload; it never degrades to "all".
pub fn resolve(scope: &Scope, payload: ToolPayload) -> ToolPayload {
    match scope.mode {
        ScopeMode::All => payload,
        ScopeMode::Selected => ToolPayload {
            groups: payload
                .groups
                .into_iter()
                .filter(|g| scope.ids.contains(&g.id))
                .collect(),
            items: payload
                .items
                .into_iter()
                .filter(|i| scope.ids.contains(&i.group_id))
                .collect(),
        },
    }
}
