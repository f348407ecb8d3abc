//! Capped diagnostic error log.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_millis, Store};
use super::types::ErrorRecord;

impl Store {
    /// Appends an error and keeps only the newest `cap` entries.
    pub async fn record_error(&self, message: &str, detail: Option<&str>, cap: usize) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO error_log (timestamp, message, detail) VALUES (?1, ?2, ?3)")
            .bind(unix_millis())
            .bind(message)
            .bind(detail)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            DELETE FROM error_log
            WHERE id NOT IN (SELECT id FROM error_log ORDER BY id DESC LIMIT ?1)
            "#,
        )
        .bind(cap as i64)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Logs `err` at error level and appends it to the error log.
    /// A failure to persist is only logged; callers never see it.
    pub async fn log_error(&self, message: &str, err: &anyhow::Error, cap: usize) {
        tracing::error!("{}: {:#}", message, err);
        let detail = format!("{:#}", err);
        if let Err(e) = self.record_error(message, Some(&detail), cap).await {
            tracing::warn!("could not persist error log entry: {:#}", e);
        }
    }

    /// The newest `limit` errors, newest first.
    pub async fn recent_errors(&self, limit: usize) -> Result<Vec<ErrorRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT timestamp, message, detail FROM error_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| ErrorRecord {
                timestamp: row.get("timestamp"),
                message: row.get("message"),
                detail: row.get("detail"),
            })
            .collect())
    }
}
