//! Summary cache operations on the SQLite backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::{CacheDb, SummaryCache};
use crate::{CanonicalTerm, Error, SummaryRecord};

/// Upper bound on a stored TTL (ten years).
const MAX_TTL_MS: u128 = 10 * 365 * 24 * 60 * 60 * 1000;

/// Fixed-width RFC 3339 so stored timestamps compare correctly as strings.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl CacheDb {
    /// Get the raw JSON of an unexpired entry.
    pub async fn get_summary_json(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT value_json FROM summaries WHERE key = ?1 AND expires_at > ?2")?;

                match stmt.query_row(params![key, now], |row| row.get(0)) {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace an entry.
    ///
    /// Uses UPSERT semantics: a later write under the same key overwrites the value and
    /// restarts its TTL.
    pub async fn put_summary_json(&self, key: &str, value_json: &str, ttl: Duration) -> Result<(), Error> {
        let key = key.to_string();
        let value_json = value_json.to_string();

        let now = Utc::now();
        let ttl = chrono::Duration::milliseconds(ttl.as_millis().min(MAX_TTL_MS) as i64);
        let fetched_at = timestamp(now);
        let expires_at = timestamp(now + ttl);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO summaries (key, value_json, fetched_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        value_json = excluded.value_json,
                        fetched_at = excluded.fetched_at,
                        expires_at = excluded.expires_at",
                    params![key, value_json, fetched_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_summaries(&self) -> Result<u64, Error> {
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM summaries WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count all stored entries, expired or not.
    pub async fn count_summaries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl SummaryCache for CacheDb {
    async fn get(&self, key: &CanonicalTerm) -> Result<Option<SummaryRecord>, Error> {
        match self.get_summary_json(key.as_str()).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CanonicalTerm, record: &SummaryRecord, ttl: Duration) -> Result<(), Error> {
        let json = serde_json::to_string(record)?;
        self.put_summary_json(key.as_str(), &json, ttl).await
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        self.purge_expired_summaries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    fn einstein() -> SummaryRecord {
        SummaryRecord::new(
            "Albert Einstein",
            "Albert Einstein was a German-born theoretical physicist.",
            "https://en.wikipedia.org/wiki/Albert_Einstein",
        )
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = normalize("albert einstein");

        db.set(&key, &einstein(), Duration::from_secs(3600)).await.unwrap();

        let retrieved = db.get(&key).await.unwrap().unwrap();
        assert_eq!(retrieved, einstein());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get(&normalize("nonexistent")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_stored_value_shape() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set(&normalize("albert einstein"), &einstein(), Duration::from_secs(60))
            .await
            .unwrap();

        let json = db.get_summary_json("Albert_Einstein").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Albert Einstein");
        assert_eq!(value["page"], "https://en.wikipedia.org/wiki/Albert_Einstein");
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = normalize("isaac newton");

        db.set(&key, &einstein(), Duration::from_secs(1)).await.unwrap();
        assert!(db.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(db.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = normalize("rust");
        let newer = SummaryRecord::new("Rust", "Rust is a programming language.", "https://en.wikipedia.org/wiki/Rust");

        db.set(&key, &einstein(), Duration::from_secs(60)).await.unwrap();
        db.set(&key, &newer, Duration::from_secs(60)).await.unwrap();

        assert_eq!(db.get(&key).await.unwrap().unwrap(), newer);
        assert_eq!(db.count_summaries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set(&normalize("expiring"), &einstein(), Duration::from_secs(1)).await.unwrap();
        db.set(&normalize("fresh"), &einstein(), Duration::from_secs(3600)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;

        let deleted = db.purge_expired().await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(db.count_summaries().await.unwrap(), 1);
        assert!(db.get(&normalize("fresh")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_summary_json("Broken", "{\"title\": 1}", Duration::from_secs(60))
            .await
            .unwrap();

        let result = db.get(&normalize("broken")).await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
