use anyhow::Result;

use crate::logic::asset_index::{AssetIndex, AssetIndexCache};
use crate::logic::candidates::{student_patterns, StudentPattern, STUDENTS_PREFIX};
use crate::model::AssetRef;
use crate::store::traits::BlobStore;

/// A student photo match and the pattern that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct StudentMatch {
    pub asset: AssetRef,
    pub kind: StudentPattern,
    pub pattern: String,
}

/// Match a student name against an already-listed index
pub fn match_student(student_name: &str, index: &AssetIndex) -> Option<StudentMatch> {
    let candidates = student_patterns(student_name);
    let patterns: Vec<&str> = candidates.iter().map(|(_, p)| p.as_str()).collect();

    let (pattern, asset) = index.find_first(&patterns)?;
    let kind = candidates
        .iter()
        .find(|(_, p)| p == pattern)
        .map(|(kind, _)| *kind)?;

    Some(StudentMatch {
        asset: asset.clone(),
        kind,
        pattern: pattern.to_string(),
    })
}

/// Finds student photos under `students/`.
///
/// There is no default photo: `Ok(None)` is a normal outcome. The listing is
/// taken through the shared [`AssetIndexCache`], so a batch of students
/// costs one listing call.
pub struct StudentImageResolver<'a, B: BlobStore + ?Sized> {
    store: &'a B,
    indexes: &'a AssetIndexCache,
}

impl<'a, B: BlobStore + ?Sized> StudentImageResolver<'a, B> {
    pub fn new(store: &'a B, indexes: &'a AssetIndexCache) -> Self {
        Self { store, indexes }
    }

    /// Errors only when the `students/` listing itself fails
    pub async fn resolve(&self, student_name: &str) -> Result<Option<AssetRef>> {
        if student_name.trim().is_empty() {
            return Ok(None);
        }

        let index = self.indexes.get_or_load(self.store, STUDENTS_PREFIX).await?;
        match match_student(student_name, &index) {
            Some(found) => {
                log::info!(
                    "Found match for {}: {} (pattern {})",
                    student_name,
                    found.asset.path,
                    found.pattern
                );
                Ok(Some(found.asset))
            }
            None => {
                log::warn!("No image found for student: {}", student_name);
                Ok(None)
            }
        }
    }
}
