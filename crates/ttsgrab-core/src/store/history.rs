//! Download history with bounded retention.

use anyhow::Result;
use sqlx::Row;

use super::db::Store;
use super::types::HistoryEntry;

impl Store {
    /// Appends `entry` and evicts the oldest records beyond `retention`.
    pub async fn append_history(&self, entry: &HistoryEntry, retention: usize) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO history (timestamp, voice, filename, file_number)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(entry.timestamp)
        .bind(&entry.voice_name)
        .bind(&entry.filename)
        .bind(entry.file_number)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"
            DELETE FROM history
            WHERE id NOT IN (SELECT id FROM history ORDER BY id DESC LIMIT ?1)
            "#,
        )
        .bind(retention as i64)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// The newest `limit` records, oldest first.
    pub async fn recent_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT timestamp, voice, filename, file_number FROM (
                SELECT id, timestamp, voice, filename, file_number
                FROM history
                ORDER BY id DESC
                LIMIT ?1
            ) ORDER BY id ASC
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryEntry {
                timestamp: row.get("timestamp"),
                voice_name: row.get("voice"),
                filename: row.get("filename"),
                file_number: row.get("file_number"),
            })
            .collect())
    }

    pub async fn clear_history(&self) -> Result<()> {
        sqlx::query("DELETE FROM history").execute(&self.pool).await?;
        Ok(())
    }

    /// Drops records older than `cutoff_millis`; returns how many were removed.
    pub async fn prune_history_before(&self, cutoff_millis: i64) -> Result<u64> {
        let r = sqlx::query("DELETE FROM history WHERE timestamp <= ?1")
            .bind(cutoff_millis)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// Keeps only the newest `keep` records; returns how many were removed.
    pub async fn retain_newest_history(&self, keep: usize) -> Result<u64> {
        let r = sqlx::query(
            r#"
            DELETE FROM history
            WHERE id NOT IN (SELECT id FROM history ORDER BY id DESC LIMIT ?1)
            "#,
        )
        .bind(keep as i64)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    pub async fn history_count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    /// Records with a timestamp after `since_millis`.
    pub async fn history_count_since(&self, since_millis: i64) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history WHERE timestamp > ?1")
            .bind(since_millis)
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }
}
