use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::model::AssetRef;
use crate::store::traits::BlobStore;

/// Public URL of a blob: the base URL followed by each percent-encoded path segment
pub fn public_url(base_url: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base_url.trim_end_matches('/'), encoded.join("/"))
}

/// Blob store backed by a local directory.
///
/// Storage paths map one-to-one onto files below `root`. Published files are
/// reachable under `public_base_url`, which the HTTP server backs with a
/// static file service over the same directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn file_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid storage path: {}", path);
        }
        Ok(self.root.join(relative))
    }

    async fn collect_files(&self, dir: PathBuf, found: &mut Vec<String>) -> Result<()> {
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to read {}", dir.display()))
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        let name = relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");
                        found.push(name);
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<AssetRef>> {
        // Walk only the directory part of the prefix; the rest filters names
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = if dir_part.is_empty() {
            self.root.clone()
        } else {
            self.file_path(dir_part)?
        };

        let mut names = Vec::new();
        self.collect_files(start, &mut names).await?;
        names.retain(|name| name.starts_with(prefix));
        names.sort();

        Ok(names.into_iter().map(AssetRef::new).collect())
    }

    async fn get_blob(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let file = self.file_path(path)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read blob {}", path)),
        }
    }

    async fn put_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let file = self.file_path(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&file, &bytes)
            .await
            .with_context(|| format!("Failed to write blob {}", path))?;

        log::debug!("Stored {} ({} bytes, {})", path, bytes.len(), content_type);
        Ok(public_url(&self.public_base_url, path))
    }
}
