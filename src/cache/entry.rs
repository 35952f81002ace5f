//! Cache row shape (spec §3 `CacheEntry`, §6 persistent cache layout).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Subset of `Cache-Control` directives the response-cache predicate needs to validate freshness.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheControl {
    pub must_revalidate: bool,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    pub access_control_public: bool,
    pub access_control_private: bool,
    pub proxy_revalidate: bool,
    pub max_age: Option<u64>,
    pub shared_max_age: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub cache_control: CacheControl,
    pub data: Vec<u8>,
}

/// A fully materialized row, as returned by `Cache::get_entry`.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub key: String,
    pub expiry_time: i64,
    pub last_accessed_time: i64,
    pub request: CacheRequest,
    pub response: CacheResponse,
}

pub(super) fn headers_to_json(headers: &[(String, String)]) -> serde_json::Value {
    let map: HashMap<&str, &str> = headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
}

pub(super) fn headers_from_json(value: &str) -> Vec<(String, String)> {
    serde_json::from_str::<HashMap<String, String>>(value)
        .map(|map| map.into_iter().collect())
        .unwrap_or_default()
}
