use anyhow::{Context, Result};
use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Pic, Run, RunFonts, Shading, Table,
    TableAlignmentType, TableCell, TableRow, WidthType,
};
use std::io::Cursor;

use crate::logic::scaling::ScaledImage;
use crate::report::document::{DocumentBuilder, HeadingLevel, PhotoCell};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const TITLE_COLOR: &str = "1F4E79";
const SECTION_COLOR: &str = "4472C4";
const HEADER_TEXT_COLOR: &str = "FFFFFF";
const FONT: &str = "Arial";
// Table columns are 1.5 inches wide, in twentieths of a point
const COLUMN_WIDTH_DXA: usize = 2160;

// Run sizes are in half-points
const fn half_points(points: usize) -> usize {
    points * 2
}

enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// [`DocumentBuilder`] producing a Word `.docx` file
#[derive(Default)]
pub struct DocxReport {
    blocks: Vec<Block>,
}

impl DocxReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    fn styled(text: &str, points: usize) -> Run {
        Run::new().add_text(text).size(half_points(points))
    }
}

impl DocumentBuilder for DocxReport {
    fn cover(&mut self, title: &str, subtitle: &str, summary: &str) {
        self.push(
            Paragraph::new()
                .add_run(Self::styled(title, 24).bold().color(TITLE_COLOR))
                .align(AlignmentType::Center),
        );
        self.push(
            Paragraph::new()
                .add_run(Self::styled(subtitle, 14).italic())
                .align(AlignmentType::Center),
        );
        self.push(
            Paragraph::new()
                .add_run(Self::styled(summary, 12).bold())
                .align(AlignmentType::Center),
        );
    }

    fn heading(&mut self, text: &str, level: HeadingLevel) {
        let (points, color) = match level {
            HeadingLevel::Project => (18, TITLE_COLOR),
            HeadingLevel::Section => (14, SECTION_COLOR),
            HeadingLevel::Member => (12, SECTION_COLOR),
        };
        self.push(
            Paragraph::new()
                .add_run(Self::styled(text, points).bold().color(color))
                .align(AlignmentType::Left),
        );
    }

    fn key_value(&mut self, label: &str, value: &str) {
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_text(format!("{}: ", label)).bold())
                .add_run(Self::styled(value, 11)),
        );
    }

    fn paragraph(&mut self, text: &str) {
        self.push(Paragraph::new().add_run(Run::new().add_text(text)));
    }

    fn table(&mut self, header: &[&str], rows: &[Vec<String>]) {
        let header_row = TableRow::new(
            header
                .iter()
                .map(|title| {
                    TableCell::new()
                        .width(COLUMN_WIDTH_DXA, WidthType::Dxa)
                        .shading(Shading::new().fill(SECTION_COLOR))
                        .add_paragraph(Paragraph::new().add_run(
                            Self::styled(title, 11).bold().color(HEADER_TEXT_COLOR),
                        ))
                })
                .collect(),
        );

        let body_rows = rows.iter().map(|row| {
            TableRow::new(
                row.iter()
                    .map(|value| {
                        TableCell::new()
                            .width(COLUMN_WIDTH_DXA, WidthType::Dxa)
                            .add_paragraph(Paragraph::new().add_run(
                                Self::styled(value, 10).fonts(RunFonts::new().ascii(FONT)),
                            ))
                    })
                    .collect(),
            )
        });

        let table = Table::new(std::iter::once(header_row).chain(body_rows).collect())
            .align(TableAlignmentType::Center);
        self.blocks.push(Block::Table(table));
        self.push(Paragraph::new());
    }

    fn image(&mut self, image: &ScaledImage, caption: &str) {
        let (width, height) = image.render.to_emu();
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_image(Pic::new(&image.png).size(width, height)))
                .align(AlignmentType::Center),
        );
        self.push(
            Paragraph::new()
                .add_run(Self::styled(caption, 10).italic())
                .align(AlignmentType::Center),
        );
    }

    fn photo_row(&mut self, cells: &[PhotoCell]) {
        let mut paragraph = Paragraph::new().align(AlignmentType::Center);
        for cell in cells {
            paragraph = match cell {
                PhotoCell::Photo { image, name } => {
                    let (width, height) = image.render.to_emu();
                    paragraph
                        .add_run(Run::new().add_image(Pic::new(&image.png).size(width, height)))
                        .add_run(Run::new().add_text(format!(" {} ", name)))
                }
                PhotoCell::Placeholder(label) => {
                    paragraph.add_run(Run::new().add_text(format!("[{}] ", label)))
                }
            };
        }
        self.push(paragraph);
        self.push(Paragraph::new());
    }

    fn page_break(&mut self) {
        self.push(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
    }

    fn finish(self) -> Result<Vec<u8>> {
        let docx = self.blocks.into_iter().fold(
            Docx::new()
                .default_fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT))
                .default_size(half_points(11)),
            |docx, block| match block {
                Block::Paragraph(paragraph) => docx.add_paragraph(paragraph),
                Block::Table(table) => docx.add_table(table),
            },
        );

        let mut buffer = Vec::new();
        docx.build()
            .pack(Cursor::new(&mut buffer))
            .context("Failed to pack docx archive")?;
        Ok(buffer)
    }
}
