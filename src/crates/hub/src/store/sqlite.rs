//! SQLite-backed workflow repository.
//!
//! One row per workflow. The full workflow (steps included) is stored as a JSON
//! document next to a few queryable columns.

use super::WorkflowRepository;
use crate::model::Workflow;
use crate::{HubError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

/// Durable repository on a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect (creating the database file if missing) and run migrations.
    ///
    /// # Arguments
    /// * `database_url` - SQLite connection string, e.g. "sqlite:hub.db" or "sqlite::memory:"
    /// * `max_connections` - pool size; in-memory databases always use one connection
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to ":memory:" opens a separate database.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.run_migrations().await?;
        tracing::info!(database_url, "Workflow repository ready");
        Ok(repository)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl WorkflowRepository for SqliteRepository {
    async fn save(&self, workflow: &Workflow) -> Result<()> {
        let document = serde_json::to_string(workflow)?;

        sqlx::query(
            "INSERT INTO workflows (id, name, status, document, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                document = excluded.document,
                updated_at = excluded.updated_at",
        )
        .bind(workflow.id.to_string())
        .bind(&workflow.name)
        .bind(workflow.status.as_str())
        .bind(&document)
        .bind(workflow.created_at.to_rfc3339())
        .bind(workflow.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Workflow>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT document FROM workflows WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((document,)) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    async fn list_active(&self) -> Result<Vec<Workflow>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT document FROM workflows
             WHERE status IN ('pending', 'active')
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(document,)| serde_json::from_str::<Workflow>(&document).map_err(HubError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OwnerProfile, ServiceKind, StepSpec, WorkflowStatus};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = SqliteRepository::connect("sqlite::memory:", 5).await.unwrap();
        repo.health_check().await.unwrap();

        let mut wf = Workflow::new(
            "sqlite",
            "stored as a document",
            vec![StepSpec::new("only", ServiceKind::Internal, "record_milestone")],
            OwnerProfile::new("u1"),
            HashMap::new(),
        )
        .unwrap();
        repo.save(&wf).await.unwrap();

        wf.status = WorkflowStatus::Failed;
        repo.save(&wf).await.unwrap();

        let loaded = repo.get(&wf.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowStatus::Failed);
        assert!(repo.list_active().await.unwrap().is_empty());
    }
}
