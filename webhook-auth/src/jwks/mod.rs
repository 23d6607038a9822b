//! JSON Web Key Set fetching and caching.

mod cache;
mod fetcher;

pub use cache::{JwksCache, RefreshPolicy};
pub use fetcher::HttpKeySetFetcher;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

use crate::error::Error;

/// Source of key sets.
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Fetch the key set published at `url`.
    async fn fetch(&self, url: &str) -> Result<JwkSet, Error>;
}
