use itertools::Itertools;
use std::collections::HashSet;

use crate::logic::normalize::{alpha_only, clean_filename, normalize, split_name, UNKNOWN};
use crate::logic::pattern_match::is_wildcard_only;
use crate::model::ProjectRecord;

pub const PROJECTS_PREFIX: &str = "projects/";
pub const STUDENTS_PREFIX: &str = "students/";
pub const DEFAULT_PROJECT_IMAGE: &str = "projects/default_project.jpg";

/// Assets uploaded under hand-picked names before naming conventions existed
pub const LEGACY_PROJECT_IMAGES: [&str; 3] = [
    "projects/dec cap vale.png",
    "projects/IOTbasedRealTimeApp.jpg",
    "projects/Scratch.png",
];

const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];
const TITLE_PREFIX_CHARS: usize = 10;

/// One step of the project image fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectImageStrategy {
    /// Direct retrieval of a full storage path
    Literal(String),
    /// Glob over the base filenames listed under [`PROJECTS_PREFIX`]
    Wildcard(String),
}

/// Project image strategies from most to least specific, duplicates removed
pub fn project_strategies(project: &ProjectRecord) -> Vec<ProjectImageStrategy> {
    let raw_title = project.title_text().unwrap_or(UNKNOWN);
    let clean_title = clean_filename(raw_title);
    let title_prefix: String = clean_title.chars().take(TITLE_PREFIX_CHARS).collect();

    let mut stems = Vec::new();
    if !project.id.is_empty() {
        stems.push(project.id.clone());
        stems.push(format!("project_{}", project.id));
    }
    stems.push(clean_title);
    stems.push(raw_title.to_string());

    let literals = stems.into_iter().flat_map(|stem| {
        IMAGE_EXTENSIONS
            .into_iter()
            .map(move |ext| ProjectImageStrategy::Literal(format!("{}{}.{}", PROJECTS_PREFIX, stem, ext)))
    });

    let wildcards = IMAGE_EXTENSIONS
        .into_iter()
        .map(|ext| format!("*{}*.{}", title_prefix, ext))
        .filter(|pattern| !title_prefix.is_empty() && !is_wildcard_only(pattern))
        .map(ProjectImageStrategy::Wildcard);

    let legacy = LEGACY_PROJECT_IMAGES
        .into_iter()
        .map(|path| ProjectImageStrategy::Literal(path.to_string()));

    literals.chain(wildcards).chain(legacy).unique().collect()
}

/// Which part of a student's name a pattern was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentPattern {
    FullName,
    FirstUnderscoreLast,
    FirstName,
    FirstThenLast,
    LastThenFirst,
    AlphaFirstName,
    AlphaFullName,
}

/// Student image patterns from most to least specific.
///
/// Patterns that need a last name are skipped for single-word names, and a
/// pattern equal to an earlier one is dropped so it never runs twice.
pub fn student_patterns(student_name: &str) -> Vec<(StudentPattern, String)> {
    if student_name.trim().is_empty() {
        return Vec::new();
    }

    let full = normalize(student_name);
    let (first, last) = split_name(student_name);
    let has_last = !last.is_empty();

    let cores = [
        (StudentPattern::FullName, full.clone(), true),
        (StudentPattern::FirstUnderscoreLast, format!("{}_{}", first, last), has_last),
        (StudentPattern::FirstName, first.clone(), true),
        (StudentPattern::FirstThenLast, format!("{}*{}", first, last), has_last),
        (StudentPattern::LastThenFirst, format!("{}*{}", last, first), has_last),
        (StudentPattern::AlphaFirstName, alpha_only(&first), true),
        (StudentPattern::AlphaFullName, alpha_only(&full), true),
    ];

    let mut seen = HashSet::new();
    cores
        .into_iter()
        .filter(|(_, core, applies)| *applies && !core.is_empty())
        .map(|(kind, core, _)| (kind, format!("*{}*", core)))
        .filter(|(_, pattern)| !is_wildcard_only(pattern) && seen.insert(pattern.clone()))
        .collect()
}
