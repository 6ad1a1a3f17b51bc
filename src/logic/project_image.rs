use std::borrow::Cow;

use crate::logic::asset_index::AssetIndexCache;
use crate::logic::candidates::{
    project_strategies, ProjectImageStrategy, DEFAULT_PROJECT_IMAGE, PROJECTS_PREFIX,
};
use crate::model::{ImageResolution, ProjectRecord, ResolvedImage};
use crate::store::traits::BlobStore;

/// Storage path candidates for an explicit image reference.
///
/// The reference may be a full download URL (`.../o/<encoded path>?alt=media`)
/// or the encoded path alone. The first candidate only undoes the separator
/// and space encodings; the second, present only when it differs, is fully
/// percent-decoded.
pub fn decode_image_reference(reference: &str) -> (String, Option<String>) {
    let encoded = reference.rsplit("/o/").next().unwrap_or(reference);
    let encoded = encoded.split('?').next().unwrap_or(encoded);
    let first = encoded.replace("%2F", "/").replace("%20", " ");

    let second = match urlencoding::decode(&first) {
        Ok(Cow::Owned(decoded)) if decoded != first => Some(decoded),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Image reference {} is not valid UTF-8 once decoded: {}", reference, e);
            None
        }
    };

    (first, second)
}

/// Resolves the lead image of a project.
///
/// Tries the explicit reference, then the ordered strategy list, then
/// [`DEFAULT_PROJECT_IMAGE`]. Every failed attempt is logged and the next one
/// is tried; only exhaustion yields [`ImageResolution::NotFound`].
pub struct ProjectImageResolver<'a, B: BlobStore + ?Sized> {
    store: &'a B,
    indexes: &'a AssetIndexCache,
}

impl<'a, B: BlobStore + ?Sized> ProjectImageResolver<'a, B> {
    pub fn new(store: &'a B, indexes: &'a AssetIndexCache) -> Self {
        Self { store, indexes }
    }

    pub async fn resolve(&self, project: &ProjectRecord) -> ImageResolution {
        if let Some(image) = self.try_explicit_reference(project).await {
            return ImageResolution::Found(image);
        }

        for strategy in project_strategies(project) {
            if let Some(image) = self.try_strategy(&strategy).await {
                return ImageResolution::Found(image);
            }
        }

        log::warn!(
            "No image found for project {} ({}), falling back to {}",
            project.id,
            project.display_title(),
            DEFAULT_PROJECT_IMAGE
        );
        match self.fetch(DEFAULT_PROJECT_IMAGE).await {
            Some(image) => ImageResolution::Found(image),
            None => {
                log::warn!("Default project image {} is missing", DEFAULT_PROJECT_IMAGE);
                ImageResolution::NotFound
            }
        }
    }

    async fn try_explicit_reference(&self, project: &ProjectRecord) -> Option<ResolvedImage> {
        let reference = project.image_reference()?;
        let (path, decoded) = decode_image_reference(reference);

        log::debug!("Trying image reference path: {}", path);
        if let Some(image) = self.fetch(&path).await {
            return Some(image);
        }

        let decoded = decoded?;
        log::debug!("Trying decoded image reference path: {}", decoded);
        self.fetch(&decoded).await
    }

    async fn try_strategy(&self, strategy: &ProjectImageStrategy) -> Option<ResolvedImage> {
        match strategy {
            ProjectImageStrategy::Literal(path) => self.fetch(path).await,
            ProjectImageStrategy::Wildcard(pattern) => {
                let index = match self.indexes.get_or_load(self.store, PROJECTS_PREFIX).await {
                    Ok(index) => index,
                    Err(e) => {
                        log::warn!("Skipping wildcard {}: {:#}", pattern, e);
                        return None;
                    }
                };
                // Unreadable matches fall through to the next match
                for asset in index.matching(pattern) {
                    log::debug!("Wildcard {} matched {}", pattern, asset.path);
                    if let Some(image) = self.fetch(&asset.path).await {
                        return Some(image);
                    }
                }
                None
            }
        }
    }

    /// One retrieval attempt; absence and failure both yield `None`
    async fn fetch(&self, path: &str) -> Option<ResolvedImage> {
        if path.is_empty() {
            return None;
        }
        match self.store.get_blob(path).await {
            Ok(Some(bytes)) => {
                log::info!("Loaded project image: {}", path);
                Some(ResolvedImage {
                    path: path.to_string(),
                    bytes,
                })
            }
            Ok(None) => {
                log::debug!("Image not found: {}", path);
                None
            }
            Err(e) => {
                log::warn!("Error downloading image {}: {:#}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn project(id: &str, title: &str, image_url: Option<&str>) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            title: Some(title.to_string()),
            image_url: image_url.map(str::to_string),
            ..Default::default()
        }
    }

    async fn resolve(store: &MemoryStore, project: &ProjectRecord) -> ImageResolution {
        let indexes = AssetIndexCache::new();
        ProjectImageResolver::new(store, &indexes).resolve(project).await
    }

    #[test]
    fn test_decode_download_url() {
        let (first, second) = decode_image_reference(
            "https://firebasestorage.googleapis.com/v0/b/bucket/o/projects%2Fsmart%20farm.jpg?alt=media&token=abc",
        );
        assert_eq!(first, "projects/smart farm.jpg");
        assert_eq!(second, None);
    }

    #[test]
    fn test_decode_plain_path_and_second_pass() {
        assert_eq!(
            decode_image_reference("projects/a.png"),
            ("projects/a.png".to_string(), None)
        );
        assert_eq!(
            decode_image_reference("projects%2Fteam%20photo%20%281%29.jpg"),
            (
                "projects/team photo %281%29.jpg".to_string(),
                Some("projects/team photo (1).jpg".to_string())
            )
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_default_image() {
        let store = MemoryStore::new();
        store.insert_blob(DEFAULT_PROJECT_IMAGE, b"default".to_vec());
        store.insert_blob("projects/unrelated.jpg", b"other".to_vec());

        let resolution = resolve(&store, &project("p1", "Solar Tracker", None)).await;

        assert_eq!(
            resolution,
            ImageResolution::Found(ResolvedImage {
                path: DEFAULT_PROJECT_IMAGE.to_string(),
                bytes: b"default".to_vec(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_default_is_not_found() {
        let store = MemoryStore::new();
        let resolution = resolve(&store, &project("p1", "Solar Tracker", None)).await;
        assert_eq!(resolution, ImageResolution::NotFound);
    }

    #[tokio::test]
    async fn test_double_encoded_reference_needs_two_attempts() {
        let store = MemoryStore::new();
        store.insert_blob("projects/team photo (1).jpg", b"team".to_vec());
        let reference = "https://host/v0/b/bucket/o/projects%2Fteam%20photo%20%281%29.jpg?alt=media";

        let resolution = resolve(&store, &project("p1", "Team", Some(reference))).await;

        assert_eq!(resolution.into_image().unwrap().bytes, b"team".to_vec());
        assert_eq!(
            store.get_calls(),
            vec!["projects/team photo %281%29.jpg", "projects/team photo (1).jpg"]
        );
    }

    #[tokio::test]
    async fn test_single_encoded_reference_resolves_first_attempt() {
        let store = MemoryStore::new();
        store.insert_blob("projects/smart farm.jpg", b"farm".to_vec());

        let resolution =
            resolve(&store, &project("p1", "Farm", Some("projects%2Fsmart%20farm.jpg"))).await;

        assert!(resolution.is_found());
        assert_eq!(store.get_calls(), vec!["projects/smart farm.jpg"]);
    }

    #[tokio::test]
    async fn test_id_literal_beats_title_wildcard() {
        let store = MemoryStore::new();
        store.insert_blob("projects/aaa_SolarTrack_v2.jpg", b"wild".to_vec());
        store.insert_blob("projects/project_p9.png", b"by-id".to_vec());

        let resolution = resolve(&store, &project("p9", "Solar Tracker", None)).await;

        let image = resolution.into_image().unwrap();
        assert_eq!(image.path, "projects/project_p9.png");
        assert_eq!(store.list_calls(PROJECTS_PREFIX), 0);
    }

    #[tokio::test]
    async fn test_wildcard_match_and_single_listing() {
        let store = MemoryStore::new();
        store.insert_blob("projects/final_SolarTrack_v2.png", b"wild".to_vec());

        let resolution = resolve(&store, &project("p9", "Solar Tracker", None)).await;

        assert_eq!(resolution.into_image().unwrap().path, "projects/final_SolarTrack_v2.png");
        assert_eq!(store.list_calls(PROJECTS_PREFIX), 1);
    }

    #[tokio::test]
    async fn test_failed_attempts_are_skipped() {
        let store = MemoryStore::new();
        store.insert_blob("projects/p3.jpg", b"broken".to_vec());
        store.fail_reads_of("projects/p3.jpg");
        store.insert_blob("projects/p3.png", b"ok".to_vec());

        let resolution = resolve(&store, &project("p3", "Anything", None)).await;

        assert_eq!(resolution.into_image().unwrap().path, "projects/p3.png");
    }

    #[tokio::test]
    async fn test_unreadable_wildcard_match_falls_through() {
        let store = MemoryStore::new();
        store.insert_blob("projects/a_WaterLevel.jpg", b"broken".to_vec());
        store.insert_blob("projects/b_WaterLevel.jpg", b"ok".to_vec());
        store.fail_reads_of("projects/a_WaterLevel.jpg");

        let resolution = resolve(&store, &project("p4", "Water Level", None)).await;

        assert_eq!(resolution.into_image().unwrap().path, "projects/b_WaterLevel.jpg");
    }

    #[tokio::test]
    async fn test_legacy_literal_is_used() {
        let store = MemoryStore::new();
        store.insert_blob("projects/Scratch.png", b"legacy".to_vec());
        store.insert_blob(DEFAULT_PROJECT_IMAGE, b"default".to_vec());

        let resolution = resolve(&store, &project("p5", "Block Coding", None)).await;

        assert_eq!(resolution.into_image().unwrap().path, "projects/Scratch.png");
    }
}
