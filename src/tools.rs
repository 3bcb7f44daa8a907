//! Tool registry: the three collaboration tools that can be shared publicly.
//!
//! The scope/sanitize engine is tool-agnostic; everything tool-specific is
//! captured by the small [`ToolSchema`] descriptor (which noun the grouping
//! dimension uses, what an item is called, whether the tool surfaces hero
//! photos).

use serde::{Deserialize, Serialize};

/// Stable key identifying one shareable tool. Doubles as the URL path
/// segment and the `tool` discriminator column in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKey {
    FixList,
    MoodBoards,
    DecisionTracker,
}

impl ToolKey {
    pub const ALL: [ToolKey; 3] = [
        ToolKey::FixList,
        ToolKey::MoodBoards,
        ToolKey::DecisionTracker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKey::FixList => "fix-list",
            ToolKey::MoodBoards => "mood-boards",
            ToolKey::DecisionTracker => "decision-tracker",
        }
    }

    /// Parses a URL path segment / storage value. Returns `None` for unknown
    /// keys; callers decide whether that is a validation error (management
    /// routes) or the generic invalid outcome (public routes).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fix-list" => Some(ToolKey::FixList),
            "mood-boards" => Some(ToolKey::MoodBoards),
            "decision-tracker" => Some(ToolKey::DecisionTracker),
            _ => None,
        }
    }

    pub fn schema(&self) -> &'static ToolSchema {
        match self {
            ToolKey::FixList => &FIX_LIST_SCHEMA,
            ToolKey::MoodBoards => &MOOD_BOARDS_SCHEMA,
            ToolKey::DecisionTracker => &DECISION_TRACKER_SCHEMA,
        }
    }
}

impl std::fmt::Display for ToolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tool schema descriptor. The grouping dimension is the one scope
/// dimension a share link can be narrowed to.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    /// Noun for the grouping dimension ("location", "board", "room").
    pub group_noun: &'static str,
    /// Noun for a single item ("issue", "idea", "decision").
    pub item_noun: &'static str,
    /// Whether items of this tool carry a hero photo.
    pub hero_photos: bool,
}

static FIX_LIST_SCHEMA: ToolSchema = ToolSchema {
    group_noun: "location",
    item_noun: "issue",
    hero_photos: false,
};

static MOOD_BOARDS_SCHEMA: ToolSchema = ToolSchema {
    group_noun: "board",
    item_noun: "idea",
    hero_photos: true,
};

static DECISION_TRACKER_SCHEMA: ToolSchema = ToolSchema {
    group_noun: "room",
    item_noun: "decision",
    hero_photos: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for tool in ToolKey::ALL {
            assert_eq!(ToolKey::parse(tool.as_str()), Some(tool));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(ToolKey::parse("budget"), None);
        assert_eq!(ToolKey::parse("FIX-LIST"), None);
        assert_eq!(ToolKey::parse(""), None);
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ToolKey::MoodBoards).unwrap();
        assert_eq!(json, "\"mood-boards\"");
        let parsed: ToolKey = serde_json::from_str("\"decision-tracker\"").unwrap();
        assert_eq!(parsed, ToolKey::DecisionTracker);
    }

    #[test]
    fn test_schema_group_nouns() {
        assert_eq!(ToolKey::FixList.schema().group_noun, "location");
        assert_eq!(ToolKey::MoodBoards.schema().group_noun, "board");
        assert_eq!(ToolKey::DecisionTracker.schema().group_noun, "room");
        assert!(ToolKey::MoodBoards.schema().hero_photos);
    }
}
