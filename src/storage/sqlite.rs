use std::str::FromStr;
use std::time::SystemTime;

use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::Row;

use super::Storage;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(url: &str) -> anyhow::Result<Sqlite> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One connection is plenty for a single user and keeps ":memory:"
        // databases alive for the lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }
}

impl Storage for Sqlite {
    fn get(&self, key: &str) -> BoxFuture<anyhow::Result<Option<String>>> {
        let query = sqlx::query("SELECT value FROM preferences WHERE key = ?1").bind(key.to_string());

        let pool = self.pool.clone();

        Box::pin(async move {
            let row = query.fetch_optional(&pool).await?;

            Ok(match row {
                Some(row) => Some(row.try_get::<String, _>("value")?),
                None => None,
            })
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<anyhow::Result<()>> {
        let query = sqlx::query(
            r#"INSERT INTO preferences (
                key,
                value,
                updated_at
            ) VALUES (
                ?1,
                ?2,
                ?3
            ) ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at"#,
        )
        .bind(key.to_string())
        .bind(value.to_string())
        .bind(DateTime::<Utc>::from(SystemTime::now()));

        let pool = self.pool.clone();

        Box::pin(async move {
            query.execute(&pool).await?;

            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<anyhow::Result<()>> {
        let query = sqlx::query("DELETE FROM preferences WHERE key = ?1").bind(key.to_string());
        let pool = self.pool.clone();

        Box::pin(async move {
            query.execute(&pool).await?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Sqlite, Storage};
    use crate::storage::{STATIONS_KEY, USE_75_PERCENT_KEY};

    #[tokio::test]
    async fn get_missing() {
        let db = Sqlite::new(":memory:").await.unwrap();

        assert_eq!(db.get(STATIONS_KEY).await.unwrap(), None);
        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn crud() {
        let db = Sqlite::new(":memory:").await.unwrap();

        db.set(STATIONS_KEY, "[]").await.unwrap();
        assert_eq!(db.get(STATIONS_KEY).await.unwrap().as_deref(), Some("[]"));

        db.set(STATIONS_KEY, r#"[{"id":"1"}]"#).await.unwrap();
        assert_eq!(
            db.get(STATIONS_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        db.remove(STATIONS_KEY).await.unwrap();
        assert_eq!(db.get(STATIONS_KEY).await.unwrap(), None);

        db.remove(STATIONS_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn booleans() {
        let db = Sqlite::new(":memory:").await.unwrap();

        db.set_bool(USE_75_PERCENT_KEY, true).await.unwrap();
        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), Some(true));

        db.set_bool(USE_75_PERCENT_KEY, false).await.unwrap();
        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), Some(false));

        db.set(USE_75_PERCENT_KEY, "maybe").await.unwrap();
        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let db = Sqlite::new(":memory:").await.unwrap();

        db.set_bool(USE_75_PERCENT_KEY, true).await.unwrap();
        db.set(STATIONS_KEY, "[]").await.unwrap();
        db.remove(STATIONS_KEY).await.unwrap();

        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), Some(true));
    }
}
