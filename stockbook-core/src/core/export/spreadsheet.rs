//! XLSX output: a header row, then one row per record with a thumbnail in the
//! first column.

use super::{ExportError, RecordRenderer};
use crate::core::thumbnail;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use rust_xlsxwriter::{Format, Image, Workbook, Worksheet};
use std::io::Cursor;

const SHEET_NAME: &str = "Records";
const HEADERS: [&str; 4] = ["Image", "Field1", "Field2", "Field3"];
/// Every thumbnail is scaled to this width; its height follows the aspect ratio.
const THUMBNAIL_WIDTH_PX: u32 = 100;
/// Column A is widened to hold a thumbnail (Excel character units).
const IMAGE_COLUMN_WIDTH: f64 = 14.3;
/// Excel refuses row heights above this many points.
const MAX_ROW_HEIGHT_PT: f64 = 409.0;
/// Tallest thumbnail that still fits inside a row of MAX_ROW_HEIGHT_PT.
const MAX_THUMBNAIL_HEIGHT_PX: u32 = 545;
/// Excel's limit on the characters in one cell.
const MAX_CELL_CHARS: usize = 32_767;

pub struct SpreadsheetRenderer {
    worksheet: Worksheet,
    row: u32,
}

impl SpreadsheetRenderer {
    pub fn new() -> Result<Self, ExportError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(SHEET_NAME)?;
        worksheet.set_column_width(0, IMAGE_COLUMN_WIDTH)?;

        let bold = Format::new().set_bold();
        for (col, header) in (0u16..).zip(HEADERS) {
            worksheet.write_string_with_format(0, col, header, &bold)?;
        }
        Ok(Self { worksheet, row: 0 })
    }
}

/// `text` cut down to what one cell can hold.
fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            log::warn!(
                "Truncating {} characters of cell text to {MAX_CELL_CHARS}",
                text.chars().count()
            );
            &text[..end]
        }
        None => text,
    }
}

impl RecordRenderer for SpreadsheetRenderer {
    fn image_width(&self) -> u32 {
        THUMBNAIL_WIDTH_PX
    }

    fn begin_record(&mut self, index: usize) -> Result<(), ExportError> {
        // Row 0 holds the headers.
        self.row = u32::try_from(index + 1)
            .map_err(|_| ExportError::Render(format!("too many rows: {index}")))?;
        Ok(())
    }

    fn image(&mut self, image: &DynamicImage) -> Result<(), ExportError> {
        // Shrink very tall thumbnails so they do not spill into the rows below.
        let image = thumbnail::fit_within(image, THUMBNAIL_WIDTH_PX, MAX_THUMBNAIL_HEIGHT_PX);
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| ExportError::Render(e.to_string()))?;

        let picture = Image::new_from_buffer(&png)?;
        self.worksheet.insert_image(self.row, 0, &picture)?;

        // Pixels to points at the default 96 dpi.
        let height_pt = (f64::from(image.height()) * 0.75).min(MAX_ROW_HEIGHT_PT);
        self.worksheet.set_row_height(self.row, height_pt)?;
        Ok(())
    }

    fn placeholder(&mut self, text: &str) -> Result<(), ExportError> {
        self.worksheet.write_string(self.row, 0, cell_text(text))?;
        Ok(())
    }

    fn field(&mut self, position: usize, _label: &str, value: &str) -> Result<(), ExportError> {
        let col = u16::try_from(position + 1)
            .map_err(|_| ExportError::Render(format!("unknown field {position}")))?;
        self.worksheet.write_string(self.row, col, cell_text(value))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        Ok(workbook.save_to_buffer()?)
    }
}
