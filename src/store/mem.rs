use anyhow::{bail, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{AssetRef, Document, RecordFilter};
use crate::store::fs::public_url;
use crate::store::traits::{BlobStore, RecordStore};

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory records and blobs.
///
/// Counts listing and retrieval calls so callers can check how many round
/// trips a batch costs, and can be told to fail reads of given paths to
/// simulate transient storage errors.
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
    failing_paths: RwLock<HashSet<String>>,
    list_calls: RwLock<HashMap<String, usize>>,
    get_calls: RwLock<Vec<String>>,
    public_base_url: String,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_public_base_url("memory://blobs")
    }

    pub fn with_public_base_url(public_base_url: impl Into<String>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            blobs: RwLock::new(BTreeMap::new()),
            failing_paths: RwLock::new(HashSet::new()),
            list_calls: RwLock::new(HashMap::new()),
            get_calls: RwLock::new(Vec::new()),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn insert_record(&self, collection: &str, document: Document) {
        self.records
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
    }

    pub fn insert_blob(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.blobs.write().insert(
            path.to_string(),
            StoredBlob {
                bytes: bytes.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    pub fn blob(&self, path: &str) -> Option<StoredBlob> {
        self.blobs.read().get(path).cloned()
    }

    /// Make every subsequent read of `path` fail
    pub fn fail_reads_of(&self, path: &str) {
        self.failing_paths.write().insert(path.to_string());
    }

    pub fn list_calls(&self, prefix: &str) -> usize {
        self.list_calls.read().get(prefix).copied().unwrap_or(0)
    }

    /// Every path passed to `get_blob`, in call order
    pub fn get_calls(&self) -> Vec<String> {
        self.get_calls.read().clone()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn list_records(
        &self,
        collection: &str,
        filter: Option<&RecordFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let records = self.records.read();
        let Some(documents) = records.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .values()
            .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .records
            .read()
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn upsert_record(&self, collection: &str, document: Document) -> Result<()> {
        self.insert_record(collection, document);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryStore {
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<AssetRef>> {
        *self.list_calls.write().entry(prefix.to_string()).or_insert(0) += 1;

        Ok(self
            .blobs
            .read()
            .keys()
            .filter(|path| path.starts_with(prefix))
            .map(AssetRef::new)
            .collect())
    }

    async fn get_blob(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.get_calls.write().push(path.to_string());

        if self.failing_paths.read().contains(path) {
            bail!("Simulated storage failure reading {}", path);
        }

        Ok(self.blobs.read().get(path).map(|blob| blob.bytes.clone()))
    }

    async fn put_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.blobs.write().insert(
            path.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.public_base_url, path))
    }
}
