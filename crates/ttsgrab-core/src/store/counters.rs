//! Per-voice sequence counters.
//!
//! The stored value is the last number handed out; 0 (or absent) means the
//! next download uses 1.

use anyhow::{bail, Result};

use super::db::Store;

impl Store {
    /// Last used number for `voice` (0 if none).
    pub async fn last_number(&self, voice: &str) -> Result<i64> {
        let last: Option<i64> = sqlx::query_scalar("SELECT last FROM counters WHERE voice = ?1")
            .bind(voice)
            .fetch_optional(&self.pool)
            .await?;
        Ok(last.unwrap_or(0))
    }

    /// Atomically increments the counter for `voice` and returns the new value.
    /// Fails without touching the row once the counter is at `i64::MAX`.
    pub async fn increment_counter(&self, voice: &str) -> Result<i64> {
        let next: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO counters (voice, last) VALUES (?1, 1)
            ON CONFLICT(voice) DO UPDATE SET last = last + 1 WHERE last < ?2
            RETURNING last
            "#,
        )
        .bind(voice)
        .bind(i64::MAX)
        .fetch_optional(&self.pool)
        .await?;
        match next {
            Some(n) => Ok(n),
            None => bail!("counter for {} is exhausted", voice),
        }
    }

    /// Overwrites the last used number for `voice`.
    pub async fn set_last_number(&self, voice: &str, last: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO counters (voice, last) VALUES (?1, ?2)
            ON CONFLICT(voice) DO UPDATE SET last = excluded.last
            "#,
        )
        .bind(voice)
        .bind(last)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the counter for `voice`. Returns false if it was already empty.
    pub async fn reset_counter(&self, voice: &str) -> Result<bool> {
        let removed: Option<i64> =
            sqlx::query_scalar("DELETE FROM counters WHERE voice = ?1 RETURNING last")
                .bind(voice)
                .fetch_optional(&self.pool)
                .await?;
        Ok(removed.is_some_and(|last| last > 0))
    }

    /// Number of voices with a counter.
    pub async fn counter_count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM counters")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }
}
