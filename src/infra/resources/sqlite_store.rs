use crate::core::resources::{NewResource, Resource, ResourceError, ResourceStore};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteResourceStore {
    pool: Pool<Sqlite>,
}

impl SqliteResourceStore {
    /// Connect to `database_url` (a file path, `sqlite://` URL or
    /// `sqlite::memory:`), creating the file and table if needed.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let path_str = database_url.trim_start_matches("sqlite://");
        if !in_memory && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        // Every connection to :memory: is its own database.
        let mut options = SqlitePoolOptions::new();
        if in_memory {
            options = options.max_connections(1);
        }
        let pool = options.connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                topic TEXT NOT NULL,
                description TEXT NOT NULL,
                link TEXT NOT NULL,
                added_by TEXT NOT NULL,
                approved BOOLEAN NOT NULL DEFAULT 0,
                approver TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn storage(e: sqlx::Error) -> ResourceError {
    ResourceError::StorageError(e.to_string())
}

fn row_to_resource(row: &SqliteRow) -> Resource {
    Resource {
        id: row.get("id"),
        subject: row.get("subject"),
        topic: row.get("topic"),
        description: row.get("description"),
        link: row.get("link"),
        added_by: row.get("added_by"),
        approved: row.get("approved"),
        approver: row.get("approver"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, subject, topic, description, link, added_by, approved, approver, created_at FROM resources";

#[async_trait]
impl ResourceStore for SqliteResourceStore {
    async fn add(&self, resource: NewResource) -> Result<Resource, ResourceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO resources (subject, topic, description, link, added_by, approved, approver, created_at)
            VALUES (?, ?, ?, ?, ?, 0, NULL, ?)
            "#,
        )
        .bind(&resource.subject)
        .bind(&resource.topic)
        .bind(&resource.description)
        .bind(&resource.link)
        .bind(resource.added_by.to_string())
        .bind(&resource.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(resource.into_resource(result.last_insert_rowid()))
    }

    async fn get(&self, id: i64) -> Result<Option<Resource>, ResourceError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        Ok(row.as_ref().map(row_to_resource))
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourceError> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        Ok(rows.iter().map(row_to_resource).collect())
    }

    async fn approve(&self, id: i64, approver: u64) -> Result<Resource, ResourceError> {
        let result = sqlx::query(
            "UPDATE resources SET approved = 1, approver = ? WHERE id = ? AND approved = 0",
        )
        .bind(approver.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        let current = self.get(id).await?.ok_or(ResourceError::NotFound(id))?;
        if result.rows_affected() == 0 {
            return Err(ResourceError::AlreadyApproved(id));
        }
        Ok(current)
    }
}
