//! Enabled flag, per-tab voice selection and the custom name list.

use anyhow::Result;

use super::db::Store;

const ENABLED_KEY: &str = "extension_enabled";

impl Store {
    /// Stored enabled flag, or None if it was never written.
    pub async fn enabled(&self) -> Result<Option<bool>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(ENABLED_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.map(|v| v == "true"))
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(ENABLED_KEY)
        .bind(if enabled { "true" } else { "false" })
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Voice selected for `tab_id`, if any.
    pub async fn tab_voice(&self, tab_id: &str) -> Result<Option<String>> {
        let voice = sqlx::query_scalar("SELECT voice FROM tab_voices WHERE tab_id = ?1")
            .bind(tab_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(voice)
    }

    pub async fn set_tab_voice(&self, tab_id: &str, voice: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tab_voices (tab_id, voice) VALUES (?1, ?2)
            ON CONFLICT(tab_id) DO UPDATE SET voice = excluded.voice
            "#,
        )
        .bind(tab_id)
        .bind(voice)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the voice for `tab_id`, storing `default_voice` first if none was chosen.
    pub async fn tab_voice_or_init(&self, tab_id: &str, default_voice: &str) -> Result<String> {
        sqlx::query("INSERT OR IGNORE INTO tab_voices (tab_id, voice) VALUES (?1, ?2)")
            .bind(tab_id)
            .bind(default_voice)
            .execute(&self.pool)
            .await?;
        let voice: String = sqlx::query_scalar("SELECT voice FROM tab_voices WHERE tab_id = ?1")
            .bind(tab_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(voice)
    }

    /// Custom names in the order they were added.
    pub async fn custom_names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM custom_names ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Appends a custom name. Validation happens in `names`; a duplicate is an error here.
    pub async fn add_custom_name(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO custom_names (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes a custom name; returns whether it existed.
    pub async fn remove_custom_name(&self, name: &str) -> Result<bool> {
        let r = sqlx::query("DELETE FROM custom_names WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }
}
