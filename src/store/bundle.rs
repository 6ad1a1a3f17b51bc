use anyhow::Result;

use crate::model::{AssetRef, Document, RecordFilter};
use crate::store::traits::{BlobStore, RecordStore};

/// Pairs an independent record store and blob store into one [`Store`](crate::store::Store)
#[derive(Debug, Clone)]
pub struct StoreBundle<R, B> {
    records: R,
    blobs: B,
}

impl<R, B> StoreBundle<R, B> {
    pub fn new(records: R, blobs: B) -> Self {
        Self { records, blobs }
    }
}

#[async_trait::async_trait]
impl<R: RecordStore, B: BlobStore> RecordStore for StoreBundle<R, B> {
    async fn list_records(
        &self,
        collection: &str,
        filter: Option<&RecordFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        self.records.list_records(collection, filter, limit).await
    }

    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.records.get_record(collection, id).await
    }

    async fn upsert_record(&self, collection: &str, document: Document) -> Result<()> {
        self.records.upsert_record(collection, document).await
    }
}

#[async_trait::async_trait]
impl<R: RecordStore, B: BlobStore> BlobStore for StoreBundle<R, B> {
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<AssetRef>> {
        self.blobs.list_blobs(prefix).await
    }

    async fn get_blob(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.blobs.get_blob(path).await
    }

    async fn put_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.blobs.put_blob(path, bytes, content_type).await
    }
}
