use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::logic::pattern_match::{find_first_match_indexed, find_matches};
use crate::model::AssetRef;
use crate::store::traits::BlobStore;

/// Snapshot of the blobs under one prefix.
///
/// Never refreshed: blobs added to the store after the listing are not seen
/// by the batch that took it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetIndex {
    assets: Vec<AssetRef>,
}

impl AssetIndex {
    pub fn new(assets: Vec<AssetRef>) -> Self {
        Self { assets }
    }

    pub async fn load<B: BlobStore + ?Sized>(store: &B, prefix: &str) -> Result<Self> {
        let assets = store
            .list_blobs(prefix)
            .await
            .with_context(|| format!("Failed to list blobs under {}", prefix))?;
        log::debug!("Indexed {} blobs under {}", assets.len(), prefix);
        Ok(Self::new(assets))
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// First asset for the earliest matching pattern, with the pattern that hit
    pub fn find_first<'a, P: AsRef<str>>(&'a self, patterns: &'a [P]) -> Option<(&'a str, &'a AssetRef)> {
        find_first_match_indexed(patterns, &self.assets)
            .map(|(idx, asset)| (patterns[idx].as_ref(), asset))
    }

    pub fn matching<'a>(&'a self, pattern: &str) -> impl Iterator<Item = &'a AssetRef> + 'a {
        find_matches(pattern, &self.assets)
    }
}

/// Batch-scoped cache of asset indexes, one listing per prefix.
///
/// A failed listing is remembered too: later callers in the same batch get
/// the error back without another round trip.
#[derive(Debug, Default)]
pub struct AssetIndexCache {
    indexes: Mutex<HashMap<String, Result<Arc<AssetIndex>, String>>>,
}

impl AssetIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<B: BlobStore + ?Sized>(
        &self,
        store: &B,
        prefix: &str,
    ) -> Result<Arc<AssetIndex>> {
        // Held across the listing so concurrent callers wait instead of listing again
        let mut indexes = self.indexes.lock().await;
        if let Some(cached) = indexes.get(prefix) {
            return cached
                .clone()
                .map_err(|e| anyhow!("Listing of {} already failed in this batch: {}", prefix, e));
        }

        match AssetIndex::load(store, prefix).await {
            Ok(index) => {
                let index = Arc::new(index);
                indexes.insert(prefix.to_string(), Ok(Arc::clone(&index)));
                Ok(index)
            }
            Err(e) => {
                indexes.insert(prefix.to_string(), Err(format!("{:#}", e)));
                Err(e)
            }
        }
    }
}
