use crate::logic::asset_index::AssetIndexCache;
use crate::logic::project_image::ProjectImageResolver;
use crate::logic::scaling::{ScaledImage, PROJECT_IMAGE_BOX, STUDENT_PHOTO_BOX};
use crate::logic::student_image::StudentImageResolver;
use crate::model::{AssemblySummary, ImageResolution, ReportProject, StudentRecord};
use crate::report::document::{DocumentBuilder, HeadingLevel, PhotoCell};
use crate::store::traits::BlobStore;

const PHOTOS_PER_ROW: usize = 3;
const TEAM_TABLE_HEADER: [&str; 4] = ["S.No.", "Name", "Role", "Email"];
const NO_MEMBERS: &str = "No team members found for this project.";

/// A project with every image it needs already fetched and scaled
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedProject {
    pub project: ReportProject,
    pub lead_image: Option<ScaledImage>,
    /// One cell per student, in team order
    pub photos: Vec<PhotoCell>,
}

/// Builds report sections from projects and their resolved images.
///
/// Image lookup is async and strictly sequential: one project and its
/// students finish before the next starts. Rendering happens afterwards in
/// a single synchronous pass. All per-image failures stop here; they become
/// placeholders or missing figures, never errors.
pub struct ReportAssembler<'a, B: BlobStore + ?Sized> {
    store: &'a B,
    indexes: AssetIndexCache,
}

impl<'a, B: BlobStore + ?Sized> ReportAssembler<'a, B> {
    pub fn new(store: &'a B) -> Self {
        Self {
            store,
            indexes: AssetIndexCache::new(),
        }
    }

    pub async fn prepare(&self, projects: Vec<ReportProject>) -> (Vec<PreparedProject>, AssemblySummary) {
        let project_images = ProjectImageResolver::new(self.store, &self.indexes);
        let student_images = StudentImageResolver::new(self.store, &self.indexes);

        let total = projects.len();
        let mut summary = AssemblySummary {
            projects: total,
            ..Default::default()
        };
        let mut prepared = Vec::with_capacity(total);

        for (idx, project) in projects.into_iter().enumerate() {
            log::info!(
                "Processing project {}/{}: {}",
                idx + 1,
                total,
                project.project.display_title()
            );

            let lead_image = match project_images.resolve(&project.project).await {
                ImageResolution::Found(image) => {
                    match ScaledImage::prepare(&image.bytes, PROJECT_IMAGE_BOX.0, PROJECT_IMAGE_BOX.1) {
                        Ok(scaled) => Some(scaled),
                        Err(e) => {
                            log::error!("Error adding project image {}: {:#}", image.path, e);
                            None
                        }
                    }
                }
                ImageResolution::NotFound => None,
            };
            if lead_image.is_some() {
                summary.project_images += 1;
            }

            let mut photos = Vec::with_capacity(project.students.len());
            for student in &project.students {
                let cell = self.student_photo(&student_images, student).await;
                match cell {
                    PhotoCell::Photo { .. } => summary.student_photos += 1,
                    PhotoCell::Placeholder(_) => summary.missing_student_photos += 1,
                }
                photos.push(cell);
            }

            prepared.push(PreparedProject {
                project,
                lead_image,
                photos,
            });
        }

        (prepared, summary)
    }

    async fn student_photo(
        &self,
        resolver: &StudentImageResolver<'_, B>,
        student: &StudentRecord,
    ) -> PhotoCell {
        let name = student.name.as_str();
        let asset = match resolver.resolve(name).await {
            Ok(Some(asset)) => asset,
            Ok(None) => return PhotoCell::Placeholder(name.to_string()),
            Err(e) => {
                log::warn!("Could not look up photo for {}: {:#}", name, e);
                return PhotoCell::Placeholder(name.to_string());
            }
        };

        let bytes = match self.store.get_blob(&asset.path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::warn!("Image not found: {}", asset.path);
                return PhotoCell::Placeholder(name.to_string());
            }
            Err(e) => {
                log::error!("Error downloading image {}: {:#}", asset.path, e);
                return PhotoCell::Placeholder(name.to_string());
            }
        };

        match ScaledImage::prepare(&bytes, STUDENT_PHOTO_BOX.0, STUDENT_PHOTO_BOX.1) {
            Ok(image) => PhotoCell::Photo {
                image,
                name: name.to_string(),
            },
            Err(e) => {
                log::error!("Error adding photo for {}: {:#}", name, e);
                PhotoCell::Placeholder(format!("Photo: {}", name))
            }
        }
    }
}

/// Write the cover page and one section per project
pub fn render_report<D: DocumentBuilder>(prepared: &[PreparedProject], generated_on: &str, doc: &mut D) {
    doc.cover(
        "PROJECT PORTFOLIO REPORT",
        &format!("Generated on {}", generated_on),
        &format!("Total Projects: {}", prepared.len()),
    );
    doc.page_break();

    for (idx, section) in prepared.iter().enumerate() {
        render_project(idx + 1, section, doc);
        if idx + 1 < prepared.len() {
            doc.page_break();
        }
    }
}

fn render_project<D: DocumentBuilder>(number: usize, section: &PreparedProject, doc: &mut D) {
    let report_project = &section.project;
    let project = &report_project.project;
    let title = project.display_title();

    doc.heading(&format!("Project {}: {}", number, title), HeadingLevel::Project);

    doc.heading("Project Overview", HeadingLevel::Section);
    doc.key_value("Description", project.display_description());
    doc.key_value("Supervisor", &report_project.supervisor_name);
    doc.key_value("Co-Supervisor", &report_project.co_supervisor_name);

    doc.heading("Timestamps", HeadingLevel::Section);
    if let Some(created_at) = report_project.created_at_display() {
        doc.key_value("Created At", &created_at);
    }

    if let Some(image) = &section.lead_image {
        doc.image(image, &format!("Figure {}: {}", number, title));
    }

    let students = &report_project.students;

    doc.heading("Team Members", HeadingLevel::Section);
    if students.is_empty() {
        doc.paragraph(NO_MEMBERS);
    } else {
        let rows: Vec<Vec<String>> = students
            .iter()
            .enumerate()
            .map(|(i, s)| {
                vec![
                    (i + 1).to_string(),
                    s.name.clone(),
                    s.role.clone(),
                    s.display_email().to_string(),
                ]
            })
            .collect();
        doc.table(&TEAM_TABLE_HEADER, &rows);
    }

    doc.heading("Team Members Details", HeadingLevel::Section);
    if students.is_empty() {
        doc.paragraph(NO_MEMBERS);
    } else {
        for (i, student) in students.iter().enumerate() {
            doc.heading(&format!("Member {}", i + 1), HeadingLevel::Member);
            doc.key_value("Name", &student.name);
            doc.key_value("Email", student.display_email());
            doc.key_value("Role", &student.role);
        }
    }

    if !students.is_empty() {
        doc.heading("Team Photos", HeadingLevel::Section);
        for row in section.photos.chunks(PHOTOS_PER_ROW) {
            doc.photo_row(row);
        }
    }
}
