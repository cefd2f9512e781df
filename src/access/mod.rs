//! Article access control.
//!
//! Two tiers: full access (owner, or collaborator through the article's
//! project team) and strict ownership. Version history and comments are
//! gated on ownership only, so collaborators can edit the live article but
//! never see its history or discussion.

use sqlx::PgPool;
use uuid::Uuid;

/// Requested access mode. Accepted but not currently differentiated: project
/// collaborators get the same write access as read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// A project's owner and its normalized team-member email list.
#[derive(Debug, sqlx::FromRow)]
pub struct ProjectTeam {
    pub user_id: Uuid,
    pub team_members: serde_json::Value,
}

impl ProjectTeam {
    pub fn member_emails(&self) -> Vec<String> {
        team_member_emails(&self.team_members)
    }

    pub fn has_member(&self, email: &str) -> bool {
        self.member_emails()
            .contains(&email.trim().to_lowercase())
    }
}

/// Normalize a stored team-member list; anything that is not an array of
/// strings reads as empty.
pub fn team_member_emails(raw: &serde_json::Value) -> Vec<String> {
    raw.as_array()
        .map(|members| {
            members
                .iter()
                .filter_map(|m| m.as_str())
                .map(|m| m.trim().to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

pub async fn fetch_project_team(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Option<ProjectTeam>, sqlx::Error> {
    sqlx::query_as::<_, ProjectTeam>(
        "SELECT user_id, team_members FROM projects WHERE id = $1 LIMIT 1",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await
}

/// Whether the actor may read or write the article: owners always can;
/// otherwise the actor's email must appear in the article's project team.
pub async fn can_access_article(
    pool: &PgPool,
    actor_id: Uuid,
    actor_email: Option<&str>,
    article_id: Uuid,
    _mode: AccessMode,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
        "SELECT user_id, project_id FROM articles WHERE id = $1 LIMIT 1",
    )
    .bind(article_id)
    .fetch_optional(pool)
    .await?;
    let Some((owner_id, project_id)) = row else {
        return Ok(false);
    };
    if owner_id == actor_id {
        return Ok(true);
    }
    let (Some(project_id), Some(email)) = (project_id, actor_email) else {
        return Ok(false);
    };
    let Some(team) = fetch_project_team(pool, project_id).await? else {
        return Ok(false);
    };
    Ok(team.has_member(email))
}

/// Exact ownership, no project fallback. Gates version history and comments.
pub async fn is_article_owner(
    pool: &PgPool,
    article_id: Uuid,
    actor_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM articles WHERE id = $1 AND user_id = $2 LIMIT 1")
        .bind(article_id)
        .bind(actor_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn team_emails_are_trimmed_and_lowercased() {
        let team = ProjectTeam {
            user_id: Uuid::new_v4(),
            team_members: json!(["  B@X.com ", "c@y.org"]),
        };
        assert_eq!(team.member_emails(), vec!["b@x.com", "c@y.org"]);
        assert!(team.has_member(" b@x.COM "));
        assert!(!team.has_member("a@x.com"));
    }

    #[test]
    fn malformed_team_lists_read_as_empty() {
        assert!(team_member_emails(&json!({"not": "array"})).is_empty());
        assert!(team_member_emails(&json!("b@x.com")).is_empty());
        assert_eq!(team_member_emails(&json!([1, "a@x.com"])), vec!["a@x.com"]);
    }
}
