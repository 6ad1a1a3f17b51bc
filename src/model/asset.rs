use serde::{Deserialize, Serialize};

/// Storage path of a blob, e.g. `students/ali_khan.jpg`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef {
    pub path: String,
}

impl AssetRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Last path segment; glob matching only ever looks at this part
    pub fn base_filename(&self) -> &str {
        base_filename(&self.path)
    }
}

impl AsRef<str> for AssetRef {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

pub fn base_filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Image bytes together with the storage path they were read from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one image lookup. Matching stops at the first hit, so there
/// is no partial or ambiguous state.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageResolution {
    Found(ResolvedImage),
    NotFound,
}

impl ImageResolution {
    pub fn is_found(&self) -> bool {
        matches!(self, ImageResolution::Found(_))
    }

    pub fn into_image(self) -> Option<ResolvedImage> {
        match self {
            ImageResolution::Found(image) => Some(image),
            ImageResolution::NotFound => None,
        }
    }
}
