use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, Executor, PgConnection, PgPool};

const STATEMENT_TIMEOUT: &str = "SET statement_timeout = '30s'";

/// SQLSTATE: invalid_catalog_name (target database missing).
const CODE_DB_DOES_NOT_EXIST: &str = "3D000";
/// SQLSTATE: duplicate_database (lost a CREATE DATABASE race, which is fine).
const CODE_DUPLICATE_DATABASE: &str = "42P04";

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(10))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute(STATEMENT_TIMEOUT).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Create the pool, creating the database itself and applying the schema when
/// needed. Standalone deployments get a working store from a bare Postgres
/// server.
pub async fn init_db(database_url: &str) -> anyhow::Result<PgPool> {
    ensure_database(database_url).await?;
    let pool = connect(database_url).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

fn is_missing_database(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err)
        if db_err.code().as_deref() == Some(CODE_DB_DOES_NOT_EXIST))
}

/// Probe the target database and create it via the `postgres` maintenance
/// database when it does not exist yet.
async fn ensure_database(database_url: &str) -> anyhow::Result<()> {
    let options = PgConnectOptions::from_str(database_url)?;
    match PgConnection::connect_with(&options).await {
        Ok(mut conn) => {
            conn.close().await.ok();
            return Ok(());
        }
        Err(err) if is_missing_database(&err) => {}
        Err(err) => return Err(err.into()),
    }

    let db_name = options.get_database().unwrap_or("writium").to_string();
    tracing::info!(database = %db_name, "database does not exist, creating");
    let admin_options = options.database("postgres");
    let mut admin = PgConnection::connect_with(&admin_options).await?;
    let create = format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\""));
    match admin.execute(create.as_str()).await {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(CODE_DUPLICATE_DATABASE) => {}
        Err(err) => {
            admin.close().await.ok();
            return Err(err.into());
        }
    }
    admin.close().await.ok();
    Ok(())
}

async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            display_name VARCHAR(200),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            team_members JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            project_id UUID,
            title VARCHAR(500) NOT NULL DEFAULT 'Untitled document',
            content TEXT NOT NULL DEFAULT '',
            template_id TEXT,
            references_json JSONB NOT NULL DEFAULT '[]'::jsonb,
            share_token TEXT UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_user_id ON articles (user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_versions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
            title VARCHAR(500) NOT NULL,
            content TEXT NOT NULL,
            references_json JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_article_versions_article_created
         ON article_versions (article_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_comments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
            user_id UUID NOT NULL,
            author_display VARCHAR(200) NOT NULL,
            content TEXT NOT NULL,
            parent_id UUID,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_article_comments_article_created
         ON article_comments (article_id, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO users (email, display_name) VALUES ('guest@writium.local', 'Guest user')
         ON CONFLICT (email) DO NOTHING",
    )
    .execute(pool)
    .await?;

    Ok(())
}
