use crate::model::{AssetRef, Document, RecordFilter};
use anyhow::Result;

/// Keyed document store holding projects, teachers and linked student
/// collections
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// List records of a collection ordered by id, optionally filtered and truncated
    async fn list_records(
        &self,
        collection: &str,
        filter: Option<&RecordFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>>;
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    async fn upsert_record(&self, collection: &str, document: Document) -> Result<()>;
}

/// Flat blob namespace addressed by `/`-separated storage paths
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// List every blob whose path starts with `prefix`, in lexical order
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<AssetRef>>;
    /// Read a blob; `Ok(None)` when it does not exist
    async fn get_blob(&self, path: &str) -> Result<Option<Vec<u8>>>;
    /// Write a blob and make it publicly readable, returning its public URL
    async fn put_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

pub trait Store: RecordStore + BlobStore + Send + Sync {}
impl<T: RecordStore + BlobStore> Store for T {}
