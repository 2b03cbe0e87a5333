//! Attempt log repository (SQLx).

use chrono::{Duration, Utc};
use tracing::warn;

use crate::Result;
use crate::database::DbPool;
use crate::database::models::{LoginAttemptRecord, NewLoginAttempt, TIMESTAMP_FORMAT};

/// SQLx-backed access to the `login_attempts` table.
#[derive(Clone)]
pub struct AttemptRepository {
    pool: DbPool,
}

impl AttemptRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append one attempt. Returns the new row id.
    pub async fn insert(&self, attempt: &NewLoginAttempt) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO login_attempts
                (timestamp, username, password, a, response_status, response_message, notification_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attempt.timestamp)
        .bind(&attempt.username)
        .bind(&attempt.password)
        .bind(&attempt.a)
        .bind(&attempt.response_status)
        .bind(&attempt.response_message)
        .bind(attempt.notification_sent as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Best-effort append. The attempt log is observability, not
    /// correctness: a storage failure must never abort the login flow.
    pub async fn record(&self, attempt: &NewLoginAttempt) {
        if let Err(e) = self.insert(attempt).await {
            warn!(error = %e, "Failed to record login attempt");
        }
    }

    /// The most recent attempts, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<LoginAttemptRecord>> {
        let records = sqlx::query_as::<_, LoginAttemptRecord>(
            r#"
            SELECT id, timestamp, username, password, a,
                   response_status, response_message, notification_sent
            FROM login_attempts
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Delete attempts strictly older than `days` days. Returns the number
    /// of rows deleted; rows at exactly the cutoff survive.
    pub async fn prune_older_than(&self, days: u32) -> Result<u64> {
        let cutoff = (Utc::now() - Duration::days(days as i64))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        let result = sqlx::query("DELETE FROM login_attempts WHERE timestamp < ?")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every attempt. Returns the number of rows deleted.
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM login_attempts")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{STATUS_TIMEOUT, now_timestamp};
    use crate::database::test_pool;

    fn attempt(status: &str, message: &str) -> NewLoginAttempt {
        NewLoginAttempt::new("alice", "ENC[..]", "1700000000", status, message, false)
    }

    #[tokio::test]
    async fn insert_and_query_newest_first() {
        let repo = AttemptRepository::new(test_pool().await);

        repo.insert(&attempt("200", "first").with_timestamp("2024-01-01T10:00:00"))
            .await
            .unwrap();
        repo.insert(&attempt("200", "second").with_timestamp("2024-01-02T10:00:00"))
            .await
            .unwrap();
        repo.insert(&attempt(STATUS_TIMEOUT, "third").with_timestamp("2024-01-03T10:00:00"))
            .await
            .unwrap();

        let records = repo.recent(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].response_message, "third");
        assert_eq!(records[0].response_status, STATUS_TIMEOUT);
        assert_eq!(records[1].response_message, "second");
    }

    #[tokio::test]
    async fn prune_keeps_rows_at_the_cutoff() {
        let repo = AttemptRepository::new(test_pool().await);

        let cutoff = (Utc::now() - Duration::days(30))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let older = (Utc::now() - Duration::days(31))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        repo.insert(&attempt("200", "at cutoff").with_timestamp(&cutoff))
            .await
            .unwrap();
        repo.insert(&attempt("200", "too old").with_timestamp(&older))
            .await
            .unwrap();
        repo.insert(&attempt("200", "fresh").with_timestamp(now_timestamp()))
            .await
            .unwrap();

        let deleted = repo.prune_older_than(30).await.unwrap();
        assert_eq!(deleted, 1);

        let remaining = repo.recent(10).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(
            remaining
                .iter()
                .all(|record| record.response_message != "too old")
        );
    }

    #[tokio::test]
    async fn clear_all_empties_the_table() {
        let repo = AttemptRepository::new(test_pool().await);

        repo.insert(&attempt("200", "a")).await.unwrap();
        repo.insert(&attempt("200", "b")).await.unwrap();

        assert_eq!(repo.clear_all().await.unwrap(), 2);
        assert!(repo.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_swallows_errors() {
        let repo = AttemptRepository::new(test_pool().await);
        // Drop the table out from under the repository.
        sqlx::query("DROP TABLE login_attempts")
            .execute(&repo.pool)
            .await
            .unwrap();

        // Must not panic or propagate.
        repo.record(&attempt("200", "ignored")).await;
    }
}
