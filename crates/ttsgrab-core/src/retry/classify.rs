//! Classify storage errors into retry policy error kinds.

use super::policy::ErrorKind;

/// Classify a sqlx error for retry decisions.
pub fn classify_sqlx_error(e: &sqlx::Error) -> ErrorKind {
    match e {
        sqlx::Error::PoolTimedOut => ErrorKind::Busy,
        sqlx::Error::Io(_) => ErrorKind::Io,
        sqlx::Error::Database(db) => {
            let msg = db.message().to_ascii_lowercase();
            if msg.contains("locked") || msg.contains("busy") {
                ErrorKind::Busy
            } else {
                ErrorKind::Other
            }
        }
        _ => ErrorKind::Other,
    }
}

/// Classify an error chain; the first sqlx or io error found decides.
pub fn classify(e: &anyhow::Error) -> ErrorKind {
    for cause in e.chain() {
        if let Some(se) = cause.downcast_ref::<sqlx::Error>() {
            return classify_sqlx_error(se);
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return ErrorKind::Io;
        }
    }
    ErrorKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_busy() {
        assert_eq!(classify_sqlx_error(&sqlx::Error::PoolTimedOut), ErrorKind::Busy);
        let e = anyhow::Error::new(sqlx::Error::PoolTimedOut).context("increment counter");
        assert_eq!(classify(&e), ErrorKind::Busy);
    }

    #[test]
    fn io_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk hiccup");
        assert_eq!(classify(&anyhow::Error::new(io)), ErrorKind::Io);
    }

    #[test]
    fn row_not_found_is_other() {
        assert_eq!(classify_sqlx_error(&sqlx::Error::RowNotFound), ErrorKind::Other);
        assert_eq!(classify(&anyhow::anyhow!("plain")), ErrorKind::Other);
    }
}
