//! Payload sanitization: the deny-by-default projection from the private
//! tool payload to the public view.
//!
//! `project_item` is the allow-list: a public field exists only because it
//! is constructed here. Reviewer contact data is dropped unconditionally
//! (comments keep the display name only). The flag application step is
//! idempotent, so re-sanitizing an already-public payload changes nothing.

use crate::models::payload::{PublicComment, PublicItem, PublicPayload, ToolItem, ToolPayload};
use crate::models::share_token::ShareFlags;

/// Produces the public projection of an already scope-filtered payload.
pub fn sanitize(payload: &ToolPayload, flags: &ShareFlags) -> PublicPayload {
    let projected = PublicPayload {
        groups: payload.groups.clone(),
        items: payload.items.iter().map(project_item).collect(),
    };
    apply_flags(projected, flags)
}

/// Redacts by flag. Idempotent: applying the same flags twice yields the
/// same payload as applying them once.
pub fn apply_flags(mut payload: PublicPayload, flags: &ShareFlags) -> PublicPayload {
    for item in &mut payload.items {
        if !flags.include_notes {
            item.notes = None;
        }
        if !flags.include_comments {
            item.comments.clear();
        }
        if !flags.include_photos {
            item.photos.clear();
            item.hero_photo = None;
        }
    }
    payload
}

/// Allow-listed projection of one item. Assignee contact data and cost
/// estimates have no public counterpart.
fn project_item(item: &ToolItem) -> PublicItem {
    PublicItem {
        id: item.id,
        group_id: item.group_id,
        title: item.title.clone(),
        status: item.status.clone(),
        sort_order: item.sort_order,
        notes: item.notes.clone(),
        comments: item
            .comments
            .iter()
            .map(|c| PublicComment {
                author: c.author_name.clone(),
                body: c.body.clone(),
                created_at: c.created_at,
            })
            .collect(),
        photos: item.photos.clone(),
        hero_photo: item.hero_photo.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::payload::{Comment, GroupRef, PhotoRef};

    fn flags(notes: bool, comments: bool, photos: bool) -> ShareFlags {
        ShareFlags {
            include_notes: notes,
            include_comments: comments,
            include_photos: photos,
        }
    }

    fn sample_payload() -> ToolPayload {
        let group = Uuid::new_v4();
        ToolPayload {
            groups: vec![GroupRef {
                id: group,
                name: "Kitchen".into(),
            }],
            items: vec![ToolItem {
                id: Uuid::new_v4(),
                group_id: group,
                title: "Backsplash".into(),
                status: Some("open".into()),
                sort_order: 1,
                notes: Some("client hates the grout color".into()),
                assignee_email: Some("tiler@example.com".into()),
                cost_estimate_cents: Some(120_000),
                comments: vec![Comment {
                    id: Uuid::new_v4(),
                    author_name: "Dana".into(),
                    author_email: "dana@example.com".into(),
                    body: "Swap for matte white?".into(),
                    created_at: Utc::now(),
                }],
                photos: vec![PhotoRef {
                    url: "https://cdn.example.com/p/1.jpg".into(),
                    caption: Some("current state".into()),
                }],
                hero_photo: Some(PhotoRef {
                    url: "https://cdn.example.com/p/hero.jpg".into(),
                    caption: None,
                }),
            }],
        }
    }

    #[test]
    fn test_full_flags_keep_allowed_content() {
        let public = sanitize(&sample_payload(), &flags(true, true, true));
        let item = &public.items[0];
        assert_eq!(item.notes.as_deref(), Some("client hates the grout color"));
        assert_eq!(item.comments.len(), 1);
        assert_eq!(item.comments[0].author, "Dana");
        assert_eq!(item.photos.len(), 1);
        assert!(item.hero_photo.is_some());
    }

    #[test]
    fn test_contact_and_private_fields_never_survive() {
        let public = sanitize(&sample_payload(), &flags(true, true, true));
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("dana@example.com"));
        assert!(!json.contains("tiler@example.com"));
        assert!(!json.contains("120000"));
        assert!(!json.contains("assignee"));
        assert!(!json.contains("cost"));
    }

    #[test]
    fn test_notes_flag_makes_notes_absent() {
        let public = sanitize(&sample_payload(), &flags(false, true, true));
        assert!(public.items[0].notes.is_none());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json["items"][0].get("notes").is_none());
    }

    #[test]
    fn test_comments_flag_empties_comment_list() {
        let public = sanitize(&sample_payload(), &flags(true, false, true));
        assert!(public.items[0].comments.is_empty());
    }

    #[test]
    fn test_photos_flag_clears_photos_and_hero() {
        let public = sanitize(&sample_payload(), &flags(true, true, false));
        assert!(public.items[0].photos.is_empty());
        assert!(public.items[0].hero_photo.is_none());
    }

    #[test]
    fn test_apply_flags_is_idempotent() {
        for (n, c, p) in [
            (false, false, false),
            (true, false, true),
            (false, true, false),
            (true, true, true),
        ] {
            let f = flags(n, c, p);
            let once = sanitize(&sample_payload(), &f);
            let twice = apply_flags(once.clone(), &f);
            assert_eq!(once, twice);
        }
    }
}
