use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payload::{Comment, GroupRef, PhotoRef, ToolItem, ToolPayload};
use crate::models::project::{CurrentUser, Project, ProjectRole};
use crate::models::share_token::{Scope, ScopeMode, ShareFlags, ShareToken};
use crate::store::{IdentityStore, ShareStore, ToolDataSource};
use crate::tools::ToolKey;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// -- Row structs --

#[derive(Debug, sqlx::FromRow)]
struct ShareTokenRow {
    id: Uuid,
    tool: String,
    project_id: Uuid,
    secret: String,
    scope_mode: String,
    scope_ids: Vec<Uuid>,
    include_notes: bool,
    include_comments: bool,
    include_photos: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<ShareTokenRow> for ShareToken {
    type Error = anyhow::Error;

    fn try_from(row: ShareTokenRow) -> anyhow::Result<Self> {
        let tool = ToolKey::parse(&row.tool)
            .ok_or_else(|| anyhow::anyhow!("share token {} has unknown tool {:?}", row.id, row.tool))?;
        let mode = match row.scope_mode.as_str() {
            "all" => ScopeMode::All,
            "selected" => ScopeMode::Selected,
            other => anyhow::bail!("share token {} has unknown scope mode {:?}", row.id, other),
        };
        Ok(ShareToken {
            id: row.id,
            tool,
            project_id: row.project_id,
            secret: row.secret,
            scope: Scope {
                mode,
                ids: row.scope_ids.into_iter().collect(),
            },
            flags: ShareFlags {
                include_notes: row.include_notes,
                include_comments: row.include_comments,
                include_photos: row.include_photos,
            },
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    group_id: Uuid,
    title: String,
    status: Option<String>,
    sort_order: i32,
    notes: Option<String>,
    assignee_email: Option<String>,
    cost_estimate_cents: Option<i64>,
    hero_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    item_id: Uuid,
    author_name: String,
    author_email: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    item_id: Uuid,
    url: String,
    caption: Option<String>,
}

const SHARE_TOKEN_COLUMNS: &str = "id, tool, project_id, secret, scope_mode, scope_ids, \
     include_notes, include_comments, include_photos, created_at, expires_at, revoked_at";

#[async_trait]
impl ShareStore for PgStore {
    async fn insert_share_token(&self, token: &ShareToken) -> anyhow::Result<()> {
        let scope_ids: Vec<Uuid> = token.scope.ids.iter().copied().collect();
        sqlx::query(
            r#"INSERT INTO share_tokens
               (id, tool, project_id, secret, scope_mode, scope_ids,
                include_notes, include_comments, include_photos, created_at, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(token.id)
        .bind(token.tool.as_str())
        .bind(token.project_id)
        .bind(&token.secret)
        .bind(match token.scope.mode {
            ScopeMode::All => "all",
            ScopeMode::Selected => "selected",
        })
        .bind(&scope_ids)
        .bind(token.flags.include_notes)
        .bind(token.flags.include_comments)
        .bind(token.flags.include_photos)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_share_tokens(
        &self,
        tool: ToolKey,
        project_id: Uuid,
    ) -> anyhow::Result<Vec<ShareToken>> {
        let rows = sqlx::query_as::<_, ShareTokenRow>(&format!(
            "SELECT {SHARE_TOKEN_COLUMNS} FROM share_tokens \
             WHERE tool = $1 AND project_id = $2 ORDER BY created_at DESC"
        ))
        .bind(tool.as_str())
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ShareToken::try_from).collect()
    }

    async fn revoke_share_token(
        &self,
        id: Uuid,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        // Idempotent: the revoked_at IS NULL guard makes a second revoke a
        // no-op instead of moving the timestamp.
        sqlx::query(
            "UPDATE share_tokens SET revoked_at = $3 \
             WHERE id = $1 AND project_id = $2 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn lookup_share_token(&self, secret: &str) -> anyhow::Result<Option<ShareToken>> {
        // Exact match against the unique secret index only.
        let row = sqlx::query_as::<_, ShareTokenRow>(&format!(
            "SELECT {SHARE_TOKEN_COLUMNS} FROM share_tokens WHERE secret = $1"
        ))
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShareToken::try_from).transpose()
    }

    async fn get_project(&self, id: Uuid) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            "SELECT id, name, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, created_at)| Project {
            id,
            name,
            created_at,
        }))
    }
}

#[async_trait]
impl ToolDataSource for PgStore {
    async fn load_payload(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<ToolPayload> {
        let groups = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM tool_groups \
             WHERE project_id = $1 AND tool = $2 ORDER BY sort_order, name",
        )
        .bind(project_id)
        .bind(tool.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, name)| GroupRef { id, name })
        .collect();

        let item_rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, group_id, title, status, sort_order, notes, \
                    assignee_email, cost_estimate_cents, hero_url \
             FROM tool_items WHERE project_id = $1 AND tool = $2 ORDER BY sort_order, title",
        )
        .bind(project_id)
        .bind(tool.as_str())
        .fetch_all(&self.pool)
        .await?;

        let item_ids: Vec<Uuid> = item_rows.iter().map(|r| r.id).collect();

        let mut comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        let mut photos: HashMap<Uuid, Vec<PhotoRef>> = HashMap::new();

        if !item_ids.is_empty() {
            let comment_rows = sqlx::query_as::<_, CommentRow>(
                "SELECT id, item_id, author_name, author_email, body, created_at \
                 FROM item_comments WHERE item_id = ANY($1) ORDER BY created_at ASC",
            )
            .bind(&item_ids)
            .fetch_all(&self.pool)
            .await?;

            for row in comment_rows {
                comments.entry(row.item_id).or_default().push(Comment {
                    id: row.id,
                    author_name: row.author_name,
                    author_email: row.author_email,
                    body: row.body,
                    created_at: row.created_at,
                });
            }

            let photo_rows = sqlx::query_as::<_, PhotoRow>(
                "SELECT item_id, url, caption FROM item_photos \
                 WHERE item_id = ANY($1) ORDER BY sort_order",
            )
            .bind(&item_ids)
            .fetch_all(&self.pool)
            .await?;

            for row in photo_rows {
                photos.entry(row.item_id).or_default().push(PhotoRef {
                    url: row.url,
                    caption: row.caption,
                });
            }
        }

        let items = item_rows
            .into_iter()
            .map(|row| ToolItem {
                id: row.id,
                group_id: row.group_id,
                title: row.title,
                status: row.status,
                sort_order: row.sort_order,
                notes: row.notes,
                assignee_email: row.assignee_email,
                cost_estimate_cents: row.cost_estimate_cents,
                comments: comments.remove(&row.id).unwrap_or_default(),
                photos: photos.remove(&row.id).unwrap_or_default(),
                hero_photo: row.hero_url.map(|url| PhotoRef { url, caption: None }),
            })
            .collect();

        Ok(ToolPayload { groups, items })
    }

    async fn group_count(&self, tool: ToolKey, project_id: Uuid) -> anyhow::Result<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tool_groups WHERE project_id = $1 AND tool = $2",
        )
        .bind(project_id)
        .bind(tool.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn user_for_session(
        &self,
        session_token: &str,
    ) -> anyhow::Result<Option<CurrentUser>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT u.id, u.name FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = $1 AND s.expires_at > NOW()",
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name)| CurrentUser { id, name }))
    }

    async fn project_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ProjectRole>> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match role {
            Some(r) => ProjectRole::from_str(&r)
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("unknown project role {:?}", r)),
            None => Ok(None),
        }
    }
}
