//! Rendering the record collection as a paginated document or a spreadsheet.
//!
//! Both formats walk the collection with the same per-record rule in
//! [`render_collection`]: the record's image scaled to the format's width (or a
//! placeholder when it cannot be loaded), then the three labeled fields. A bad
//! image only degrades its own record; it never aborts the export.

pub mod document;
pub mod spreadsheet;

use crate::core::record::Record;
use crate::core::thumbnail::{self, LoadedImage};
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub use document::DocumentRenderer;
pub use spreadsheet::SpreadsheetRenderer;

/// Errors specific to export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no records")]
    NoRecords,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document error: {0}")]
    Render(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl ExportError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoRecords => "No records available to export.".to_string(),
            Self::Io(e) => format!("Failed to write export: {e}"),
            Self::Render(e) => format!("Failed to export PDF: {e}"),
            Self::Spreadsheet(e) => format!("Failed to export Excel: {e}"),
        }
    }
}

impl From<tempfile::PersistError> for ExportError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

/// The two supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One PDF page per record.
    Document,
    /// One XLSX row per record with an embedded thumbnail.
    Spreadsheet,
}

impl ExportFormat {
    /// Fixed file name the export is written to.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Document => "records.pdf",
            Self::Spreadsheet => "records.xlsx",
        }
    }
}

/// A format-specific sink for the shared per-record walk.
///
/// [`render_collection`] decides what goes into each record; implementations
/// only decide where it lands.
pub trait RecordRenderer {
    /// Width in pixels embedded images are scaled to.
    fn image_width(&self) -> u32;

    /// Starts output for the record at `index`.
    fn begin_record(&mut self, index: usize) -> Result<(), ExportError>;

    /// Embeds an image already scaled to [`image_width`](Self::image_width).
    ///
    /// An error here is treated like an unreadable image: the walk falls back to
    /// [`placeholder`](Self::placeholder) for this record.
    fn image(&mut self, image: &DynamicImage) -> Result<(), ExportError>;

    /// Writes `text` where the image would have gone.
    fn placeholder(&mut self, text: &str) -> Result<(), ExportError>;

    /// Writes one of the record's fields. `position` is 0, 1 or 2.
    fn field(&mut self, position: usize, label: &str, value: &str) -> Result<(), ExportError>;

    /// Produces the finished file contents.
    fn finish(self: Box<Self>) -> Result<Vec<u8>, ExportError>;
}

/// Runs the per-record rule over `records` and returns the rendered bytes.
///
/// # Errors
///
/// Returns [`ExportError::NoRecords`] for an empty collection. Image problems
/// never surface here; they become placeholders.
pub fn render_collection(
    mut renderer: Box<dyn RecordRenderer>,
    records: &[Record],
) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    for (index, record) in records.iter().enumerate() {
        renderer.begin_record(index)?;

        match thumbnail::load_image(Path::new(&record.image_path)) {
            LoadedImage::Image(img) => {
                let scaled = thumbnail::scale_to_width(&img, renderer.image_width());
                if let Err(e) = renderer.image(&scaled) {
                    log::warn!("Record {index}: could not embed {}: {e}", record.image_path);
                    renderer.placeholder(&format!("Error loading image: {e}"))?;
                }
            }
            LoadedImage::Placeholder(text) => {
                log::warn!("Record {index}: {text} ({})", record.image_path);
                renderer.placeholder(&text)?;
            }
        }

        for (position, (label, value)) in record.labeled_fields().into_iter().enumerate() {
            renderer.field(position, label, value)?;
        }
    }

    renderer.finish()
}

/// Renders collections and writes them to their fixed output files.
#[derive(Debug, Clone, Default)]
pub struct ExportEngine {
    font_path: Option<PathBuf>,
}

impl ExportEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the TrueType font at `path` for document text instead of the
    /// built-in Helvetica, so non-Latin field values render.
    pub fn with_font(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = path;
        self
    }

    fn renderer(&self, format: ExportFormat) -> Result<Box<dyn RecordRenderer>, ExportError> {
        let renderer: Box<dyn RecordRenderer> = match format {
            ExportFormat::Document => Box::new(DocumentRenderer::new(self.font_path.as_deref())?),
            ExportFormat::Spreadsheet => Box::new(SpreadsheetRenderer::new()?),
        };
        Ok(renderer)
    }

    /// Renders `records` in `format` and returns the file contents.
    pub fn render(&self, format: ExportFormat, records: &[Record]) -> Result<Vec<u8>, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoRecords);
        }
        render_collection(self.renderer(format)?, records)
    }

    pub fn export_document(&self, records: &[Record]) -> Result<Vec<u8>, ExportError> {
        self.render(ExportFormat::Document, records)
    }

    pub fn export_spreadsheet(&self, records: &[Record]) -> Result<Vec<u8>, ExportError> {
        self.render(ExportFormat::Spreadsheet, records)
    }

    /// Renders `records` and writes them to `format`'s fixed file name inside
    /// `output_dir`, replacing any previous export.
    ///
    /// Nothing is written unless rendering succeeds, and the file is replaced
    /// atomically. Returns the path written.
    pub fn write(
        &self,
        format: ExportFormat,
        records: &[Record],
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let bytes = self.render(format, records)?;

        fs::create_dir_all(output_dir)?;
        let target = output_dir.join(format.file_name());
        let mut tmp = NamedTempFile::new_in(output_dir)?;
        std::io::Write::write_all(tmp.as_file_mut(), &bytes)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target)?;

        log::info!("Exported {} records to {}", records.len(), target.display());
        Ok(target)
    }
}
