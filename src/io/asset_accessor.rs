//! `IAssetAccessor` (spec §6): HTTP fetch with cache-backed reuse, grounded in
//! `examples/terrence2-nitrogen/libs/system/catalog/src/catalog.rs`'s async data-access trait
//! shape (pack reference) and the teacher's loader-trait pattern
//! (`examples/kurtkuehnert-bevy_terrain/src/terrain_data/tile_loader.rs`).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheControl, CacheRequest, CacheResponse};

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),
}

#[derive(Clone, Debug)]
pub struct AssetResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub cache_control: CacheControl,
    pub data: Vec<u8>,
}

pub trait AssetAccessor: Send + Sync {
    fn get(
        &self,
        url: String,
        headers: Vec<(String, String)>,
    ) -> BoxFuture<'static, Result<AssetResponse, AssetError>>;
}

/// `reqwest`-backed accessor that consults the persistent [`Cache`] before issuing a request, and
/// stores successful responses back into it (spec §4.1/§4.4 integration).
pub struct CachingAssetAccessor {
    client: reqwest::Client,
    cache: Arc<Cache>,
}

impl CachingAssetAccessor {
    pub fn new(client: reqwest::Client, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    fn cache_key(url: &str) -> String {
        url.to_string()
    }

    async fn fetch(
        client: reqwest::Client,
        cache: Arc<Cache>,
        url: String,
        headers: Vec<(String, String)>,
    ) -> Result<AssetResponse, AssetError> {
        let key = Self::cache_key(&url);

        if let Some(entry) = cache.get_entry(&key, |entry| !entry.response.cache_control.no_cache)? {
            debug!(url = %url, "asset served from cache");
            return Ok(AssetResponse {
                status_code: entry.response.status_code,
                headers: entry.response.headers,
                content_type: entry.response.content_type,
                cache_control: entry.response.cache_control,
                data: entry.response.data,
            });
        }

        let mut request = client.get(&url);
        for (name, value) in &headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let data = response.bytes().await?.to_vec();

        let asset_response = AssetResponse {
            status_code,
            headers: response_headers.clone(),
            content_type: content_type.clone(),
            cache_control: CacheControl::default(),
            data: data.clone(),
        };

        if (200..300).contains(&status_code) {
            let stored = cache.store_response(
                &key,
                i64::MAX,
                &CacheRequest {
                    method: "GET".into(),
                    url: url.clone(),
                    headers,
                },
                &CacheResponse {
                    status_code,
                    headers: response_headers,
                    content_type,
                    cache_control: CacheControl::default(),
                    data,
                },
            );
            if let Err(error) = stored {
                warn!(url = %url, %error, "failed to persist response cache entry");
            }
        }

        Ok(asset_response)
    }
}

impl AssetAccessor for CachingAssetAccessor {
    fn get(
        &self,
        url: String,
        headers: Vec<(String, String)>,
    ) -> BoxFuture<'static, Result<AssetResponse, AssetError>> {
        let client = self.client.clone();
        let cache = self.cache.clone();
        Box::pin(Self::fetch(client, cache, url, headers))
    }
}
