//! Persistent response cache (spec §4.1), grounded in
//! `examples/original_source/CesiumAsync/src/DiskCache.cpp`.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::entry::{
    headers_from_json, headers_to_json, CacheControl, CacheEntry, CacheRequest, CacheResponse,
};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single-table, single-connection persistent cache. Not shared across instances; callers that
/// need concurrent access should wrap this in their own synchronization (the underlying SQLite
/// connection already serializes writers via WAL + a 5s busy timeout).
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS CacheItemTable (
                id INTEGER PRIMARY KEY,
                expiryTime INTEGER,
                lastAccessedTime INTEGER,
                accessSeq INTEGER,
                responseHeaders TEXT,
                responseContentType TEXT,
                responseStatusCode INTEGER,
                responseCacheControl TEXT,
                responseData BLOB,
                requestHeader TEXT,
                requestMethod TEXT,
                requestUrl TEXT,
                key TEXT UNIQUE
            );
            CREATE INDEX IF NOT EXISTS key_index ON CacheItemTable(key);",
        )?;
        Ok(Self { conn })
    }

    /// Returns the first row for `key` accepted by `predicate`, refreshing its last-accessed
    /// timestamp. The predicate decides cache-control freshness; rejected rows are skipped but
    /// not removed.
    pub fn get_entry(
        &self,
        key: &str,
        predicate: impl Fn(&CacheEntry) -> bool,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let mut stmt = self.conn.prepare(
            "SELECT expiryTime, lastAccessedTime, responseHeaders, responseContentType,
                    responseStatusCode, responseCacheControl, responseData,
                    requestHeader, requestMethod, requestUrl
             FROM CacheItemTable WHERE key = ?1",
        )?;
        let mut rows = stmt.query(params![key])?;
        while let Some(row) = rows.next()? {
            let cache_control_json: String = row.get(5)?;
            let entry = CacheEntry {
                key: key.to_string(),
                expiry_time: row.get(0)?,
                last_accessed_time: row.get(1)?,
                request: CacheRequest {
                    method: row.get(8)?,
                    url: row.get(9)?,
                    headers: headers_from_json(&row.get::<_, String>(7)?),
                },
                response: CacheResponse {
                    status_code: row.get::<_, i64>(4)? as u16,
                    headers: headers_from_json(&row.get::<_, String>(2)?),
                    content_type: row.get(3)?,
                    cache_control: serde_json::from_str::<CacheControl>(&cache_control_json)?,
                    data: row.get(6)?,
                },
            };
            if predicate(&entry) {
                self.touch(key)?;
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// `accessSeq` is a monotonic counter kept alongside `lastAccessedTime`: the timestamp has
    /// only second resolution, which makes LRU order ambiguous for accesses within the same
    /// second, so eviction ordering is decided by `accessSeq` instead.
    fn touch(&self, key: &str) -> Result<(), CacheError> {
        self.conn.execute(
            "UPDATE CacheItemTable SET
                lastAccessedTime = strftime('%s','now'),
                accessSeq = (SELECT COALESCE(MAX(accessSeq), 0) + 1 FROM CacheItemTable)
             WHERE key = ?1",
            params![key],
        )?;
        Ok(())
    }

    pub fn store_response(
        &self,
        key: &str,
        expiry_time: i64,
        request: &CacheRequest,
        response: &CacheResponse,
    ) -> Result<bool, CacheError> {
        let response_headers = headers_to_json(&response.headers).to_string();
        let request_headers = headers_to_json(&request.headers).to_string();
        let cache_control = serde_json::to_string(&response.cache_control)?;
        self.conn.execute(
            "REPLACE INTO CacheItemTable
                (expiryTime, lastAccessedTime, accessSeq, responseHeaders, responseContentType,
                 responseStatusCode, responseCacheControl, responseData,
                 requestHeader, requestMethod, requestUrl, key)
             VALUES (?1, strftime('%s','now'),
                     (SELECT COALESCE(MAX(accessSeq), 0) + 1 FROM CacheItemTable),
                     ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                expiry_time,
                response_headers,
                response.content_type,
                response.status_code as i64,
                cache_control,
                response.data,
                request_headers,
                request.method,
                request.url,
                key,
            ],
        )?;
        Ok(true)
    }

    pub fn remove_entry(&self, key: &str) -> Result<bool, CacheError> {
        let changed = self
            .conn
            .execute("DELETE FROM CacheItemTable WHERE key = ?1", params![key])?;
        Ok(changed > 0)
    }

    /// Expire-then-LRU-trim, matching `DiskCache::prune`: a no-op whenever the table already
    /// fits within `max_items`.
    pub fn prune(&self, max_items: u64) -> Result<bool, CacheError> {
        let total_items: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM CacheItemTable", [], |row| row.get(0))?;
        if total_items > 0 && total_items <= max_items {
            return Ok(true);
        }

        let deleted_rows = self.conn.execute(
            "DELETE FROM CacheItemTable WHERE expiryTime < strftime('%s','now')",
            [],
        )? as u64;

        if total_items.saturating_sub(deleted_rows) < max_items {
            return Ok(true);
        }

        self.conn.execute(
            "DELETE FROM CacheItemTable WHERE id IN (
                SELECT id FROM CacheItemTable ORDER BY accessSeq ASC LIMIT ?1
             )",
            params![total_items.saturating_sub(max_items)],
        )?;
        Ok(true)
    }

    pub fn clear_all(&self) -> Result<(), CacheError> {
        self.conn.execute("DELETE FROM CacheItemTable", [])?;
        Ok(())
    }

    pub fn row_count(&self) -> Result<u64, CacheError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM CacheItemTable", [], |row| row.get(0))?)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM CacheItemTable WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(url: &str) -> CacheRequest {
        CacheRequest {
            method: "GET".into(),
            url: url.into(),
            headers: vec![],
        }
    }

    fn sample_response(body: &[u8]) -> CacheResponse {
        CacheResponse {
            status_code: 200,
            headers: vec![],
            content_type: Some("application/octet-stream".into()),
            cache_control: CacheControl::default(),
            data: body.to_vec(),
        }
    }

    #[test]
    fn round_trip_updates_last_accessed() {
        let cache = Cache::open_in_memory().unwrap();
        let request = sample_request("https://example.test/tile");
        let response = sample_response(b"hello");
        cache
            .store_response("k1", i64::MAX, &request, &response)
            .unwrap();

        let entry = cache.get_entry("k1", |_| true).unwrap().unwrap();
        assert_eq!(entry.response.data, b"hello");
        assert_eq!(entry.request.url, "https://example.test/tile");
        assert!(entry.last_accessed_time > 0);
    }

    #[test]
    fn predicate_rejecting_all_rows_returns_none() {
        let cache = Cache::open_in_memory().unwrap();
        cache
            .store_response("k1", i64::MAX, &sample_request("u"), &sample_response(b"x"))
            .unwrap();
        assert!(cache.get_entry("k1", |_| false).unwrap().is_none());
    }

    #[test]
    fn store_response_replaces_existing_key() {
        let cache = Cache::open_in_memory().unwrap();
        let request = sample_request("u");
        cache
            .store_response("k1", i64::MAX, &request, &sample_response(b"first"))
            .unwrap();
        cache
            .store_response("k1", i64::MAX, &request, &sample_response(b"second"))
            .unwrap();
        assert_eq!(cache.row_count().unwrap(), 1);
        let entry = cache.get_entry("k1", |_| true).unwrap().unwrap();
        assert_eq!(entry.response.data, b"second");
    }

    #[test]
    fn prune_evicts_expired_then_lru_oldest() {
        let cache = Cache::open_in_memory().unwrap();
        let req = sample_request("u");
        let resp = sample_response(b"x");

        cache.store_response("k1", i64::MAX, &req, &resp).unwrap();
        cache.store_response("k2", i64::MAX, &req, &resp).unwrap();
        cache.store_response("k3", i64::MAX, &req, &resp).unwrap();
        // touch k1 so it is more recently accessed than k2/k3
        cache.get_entry("k1", |_| true).unwrap();
        cache.store_response("k4", i64::MAX, &req, &resp).unwrap();

        cache.prune(3).unwrap();

        assert!(cache.contains_key("k1").unwrap());
        assert!(!cache.contains_key("k2").unwrap());
        assert!(cache.contains_key("k3").unwrap());
        assert!(cache.contains_key("k4").unwrap());
    }

    #[test]
    fn prune_is_noop_under_capacity() {
        let cache = Cache::open_in_memory().unwrap();
        cache
            .store_response("k1", i64::MAX, &sample_request("u"), &sample_response(b"x"))
            .unwrap();
        cache.prune(10).unwrap();
        assert_eq!(cache.row_count().unwrap(), 1);
    }
}
