use std::time::Duration;

use futures::StreamExt;
use moka::future::Cache;
use sqlx::SqlitePool;

/// Display identity of an employee. Identity fields are never updated after
/// creation, so cached entries cannot go stale.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeIdentity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
}

/// In-memory identity cache keeping the login hot path off the database.
/// Built once at startup and injected as app data.
#[derive(Clone)]
pub struct IdentityCache {
    inner: Cache<i64, EmployeeIdentity>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }

    /// Look up an employee's identity, hitting the store only on a miss.
    pub async fn resolve(
        &self,
        pool: &SqlitePool,
        employee_id: i64,
    ) -> Result<Option<EmployeeIdentity>, sqlx::Error> {
        if let Some(identity) = self.inner.get(&employee_id).await {
            return Ok(Some(identity));
        }

        let row = sqlx::query_as::<_, EmployeeIdentity>(
            "SELECT id, name, email, department FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;

        if let Some(identity) = &row {
            self.inner.insert(employee_id, identity.clone()).await;
        }

        Ok(row)
    }

    /// Seed the cache for a freshly created employee.
    pub async fn insert(&self, identity: EmployeeIdentity) {
        self.inner.insert(identity.id, identity).await;
    }

    /// Load existing employees into the cache at startup, in batches.
    pub async fn warmup(&self, pool: &SqlitePool, batch_size: usize) -> anyhow::Result<()> {
        let mut stream = sqlx::query_as::<_, EmployeeIdentity>(
            "SELECT id, name, email, department FROM employees ORDER BY id",
        )
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total += 1;

            if batch.len() >= batch_size {
                self.insert_batch(&mut batch).await;
            }
        }

        if !batch.is_empty() {
            self.insert_batch(&mut batch).await;
        }

        tracing::info!(total, "identity cache warmup complete");
        Ok(())
    }

    async fn insert_batch(&self, batch: &mut Vec<EmployeeIdentity>) {
        let inserts: Vec<_> = batch
            .drain(..)
            .map(|identity| self.inner.insert(identity.id, identity))
            .collect();

        futures::future::join_all(inserts).await;
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}
