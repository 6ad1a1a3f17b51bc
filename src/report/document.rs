use anyhow::Result;

use crate::logic::scaling::ScaledImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    Project,
    Section,
    Member,
}

/// One slot in a row of team photos
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoCell {
    Photo { image: ScaledImage, name: String },
    /// Rendered as `[<label>]`
    Placeholder(String),
}

/// Append-only document sink the report is written into
pub trait DocumentBuilder {
    fn cover(&mut self, title: &str, subtitle: &str, summary: &str);
    fn heading(&mut self, text: &str, level: HeadingLevel);
    fn key_value(&mut self, label: &str, value: &str);
    fn paragraph(&mut self, text: &str);
    fn table(&mut self, header: &[&str], rows: &[Vec<String>]);
    /// Centered image at its render size, followed by a caption
    fn image(&mut self, image: &ScaledImage, caption: &str);
    fn photo_row(&mut self, cells: &[PhotoCell]);
    fn page_break(&mut self);
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Records every call as a readable line, for assertions on report structure
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingDocument {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl DocumentBuilder for RecordingDocument {
    fn cover(&mut self, title: &str, subtitle: &str, summary: &str) {
        self.lines.push(format!("cover: {} | {} | {}", title, subtitle, summary));
    }

    fn heading(&mut self, text: &str, level: HeadingLevel) {
        self.lines.push(format!("heading {:?}: {}", level, text));
    }

    fn key_value(&mut self, label: &str, value: &str) {
        self.lines.push(format!("{}: {}", label, value));
    }

    fn paragraph(&mut self, text: &str) {
        self.lines.push(format!("text: {}", text));
    }

    fn table(&mut self, header: &[&str], rows: &[Vec<String>]) {
        self.lines.push(format!("table: {}", header.join(" | ")));
        for row in rows {
            self.lines.push(format!("row: {}", row.join(" | ")));
        }
    }

    fn image(&mut self, image: &ScaledImage, caption: &str) {
        self.lines.push(format!(
            "image {}x{} in: {}",
            image.render.width, image.render.height, caption
        ));
    }

    fn photo_row(&mut self, cells: &[PhotoCell]) {
        let cells: Vec<String> = cells
            .iter()
            .map(|cell| match cell {
                PhotoCell::Photo { name, .. } => format!("photo({})", name),
                PhotoCell::Placeholder(label) => format!("[{}]", label),
            })
            .collect();
        self.lines.push(format!("photos: {}", cells.join(" ")));
    }

    fn page_break(&mut self) {
        self.lines.push("page break".to_string());
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.lines.join("\n").into_bytes())
    }
}
