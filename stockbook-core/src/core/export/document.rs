//! PDF output: one A4 page per record.

use super::{ExportError, RecordRenderer};
use image::{DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
/// Printed width of every embedded image.
const IMAGE_WIDTH_MM: f32 = 100.0;
/// Pixel width images are resampled to before embedding (100 mm at 150 dpi).
const IMAGE_WIDTH_PX: u32 = 591;
const LINE_HEIGHT_MM: f32 = 10.0;
/// Tallest an image may print so the three field lines still fit below it.
const MAX_IMAGE_HEIGHT_MM: f32 = PAGE_HEIGHT_MM - 3.0 * MARGIN_MM - 3.0 * LINE_HEIGHT_MM;
/// Distance from the top of a line to the text baseline.
const BASELINE_MM: f32 = 7.0;
const FONT_SIZE_PT: f32 = 12.0;
const LAYER_NAME: &str = "Record";

/// Lays out records on PDF pages.
///
/// Positions are tracked as a distance from the top of the page and converted
/// to PDF's bottom-up coordinates when drawing.
pub struct DocumentRenderer {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    /// The page created together with the document, used by the first record.
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    layer: Option<PdfLayerReference>,
    y_mm: f32,
}

impl DocumentRenderer {
    /// Creates an empty document, loading the TrueType font at `font_path` if
    /// given and using built-in Helvetica otherwise.
    pub fn new(font_path: Option<&Path>) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new("Records", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let font = match font_path {
            Some(path) => doc
                .add_external_font(BufReader::new(File::open(path)?))
                .map_err(|e| ExportError::Render(format!("{}: {e}", path.display())))?,
            None => doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Render(e.to_string()))?,
        };
        Ok(Self {
            doc,
            font,
            first_page: Some((page, layer)),
            layer: None,
            y_mm: MARGIN_MM,
        })
    }

    fn current_layer(&self) -> Result<&PdfLayerReference, ExportError> {
        self.layer
            .as_ref()
            .ok_or_else(|| ExportError::Render("no page started".to_string()))
    }

    /// Writes `text` on a new line and advances the position.
    fn line(&mut self, text: &str) -> Result<(), ExportError> {
        let baseline = PAGE_HEIGHT_MM - (self.y_mm + BASELINE_MM);
        self.current_layer()?
            .use_text(text, FONT_SIZE_PT, Mm(MARGIN_MM), Mm(baseline), &self.font);
        self.y_mm += LINE_HEIGHT_MM;
        Ok(())
    }
}

/// Printed size of a `w` x `h` image: IMAGE_WIDTH_MM wide, unless that would
/// make it taller than MAX_IMAGE_HEIGHT_MM, in which case the height is capped
/// and the width follows.
fn printed_size(w: u32, h: u32) -> (f32, f32) {
    let height_mm = h as f32 * IMAGE_WIDTH_MM / w as f32;
    if height_mm <= MAX_IMAGE_HEIGHT_MM {
        (IMAGE_WIDTH_MM, height_mm)
    } else {
        (w as f32 * MAX_IMAGE_HEIGHT_MM / h as f32, MAX_IMAGE_HEIGHT_MM)
    }
}

impl RecordRenderer for DocumentRenderer {
    fn image_width(&self) -> u32 {
        IMAGE_WIDTH_PX
    }

    fn begin_record(&mut self, _index: usize) -> Result<(), ExportError> {
        let (page, layer) = match self.first_page.take() {
            Some(first) => first,
            None => self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME),
        };
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        self.y_mm = MARGIN_MM;
        Ok(())
    }

    fn image(&mut self, image: &DynamicImage) -> Result<(), ExportError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(ExportError::Render("image has no pixels".to_string()));
        }
        let (width_mm, height_mm) = printed_size(w, h);
        // Choose the resolution that makes the pixel width print at width_mm.
        let dpi = w as f32 * 25.4 / width_mm;

        let layer = self.current_layer()?.clone();
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - MARGIN_MM - height_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y_mm = MARGIN_MM + height_mm + MARGIN_MM;
        Ok(())
    }

    fn placeholder(&mut self, text: &str) -> Result<(), ExportError> {
        self.line(text)?;
        self.y_mm += 2.0 * LINE_HEIGHT_MM;
        Ok(())
    }

    fn field(&mut self, _position: usize, label: &str, value: &str) -> Result<(), ExportError> {
        self.line(&format!("{label}: {value}"))
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::render_collection;
    use crate::core::export::tests::{record, write_png};
    use crate::core::thumbnail;
    use tempfile::TempDir;

    /// What each page draws: its text strings and the operators it uses.
    struct PageOps {
        texts: Vec<String>,
        operators: Vec<String>,
    }

    fn read_pages(bytes: &[u8]) -> Vec<PageOps> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&id| {
                let content =
                    lopdf::content::Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
                let mut page = PageOps {
                    texts: Vec::new(),
                    operators: Vec::new(),
                };
                for op in content.operations {
                    for operand in &op.operands {
                        if let lopdf::Object::String(text, _) = operand {
                            page.texts.push(String::from_utf8_lossy(text).into_owned());
                        }
                    }
                    page.operators.push(op.operator);
                }
                page
            })
            .collect()
    }

    #[test]
    fn test_document_with_image_and_placeholder() {
        let dir = TempDir::new().unwrap();
        let tall = write_png(dir.path(), "tall.png", 30, 90);
        let wide = write_png(dir.path(), "wide.png", 900, 300);
        let records = vec![
            record(&tall, "first", "", "2024-01-01"),
            record(&dir.path().join("missing.png"), "second", "b", "c"),
            record(&wide, "third", "comma, text", "\"quoted\""),
        ];

        let renderer = DocumentRenderer::new(None).unwrap();
        let bytes = render_collection(Box::new(renderer), &records).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_single_missing_image_still_renders() {
        let dir = TempDir::new().unwrap();
        let records = vec![record(&dir.path().join("nope.jpg"), "x", "y", "z")];

        let renderer = DocumentRenderer::new(None).unwrap();
        let bytes = render_collection(Box::new(renderer), &records).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_placeholder_reserves_space_before_fields() {
        let mut renderer = DocumentRenderer::new(None).unwrap();
        renderer.begin_record(0).unwrap();
        renderer.placeholder("Image not found").unwrap();
        assert_eq!(renderer.y_mm, MARGIN_MM + 3.0 * LINE_HEIGHT_MM);
    }

    #[test]
    fn test_image_pushes_fields_below_it() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "a.png", 200, 100);
        let img = image::open(path).unwrap();

        let mut renderer = DocumentRenderer::new(None).unwrap();
        renderer.begin_record(0).unwrap();
        renderer.image(&img).unwrap();
        // 200x100 printed 100 mm wide is 50 mm tall.
        assert!((renderer.y_mm - (MARGIN_MM + 50.0 + MARGIN_MM)).abs() < 0.01);

        renderer.begin_record(1).unwrap();
        assert_eq!(renderer.y_mm, MARGIN_MM, "each record starts a fresh page");
    }

    #[test]
    fn test_tall_image_leaves_room_for_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "tall.png", 30, 90);
        let scaled = thumbnail::scale_to_width(&image::open(&path).unwrap(), IMAGE_WIDTH_PX);

        let mut renderer = DocumentRenderer::new(None).unwrap();
        renderer.begin_record(0).unwrap();
        renderer.image(&scaled).unwrap();
        assert!((renderer.y_mm - (2.0 * MARGIN_MM + MAX_IMAGE_HEIGHT_MM)).abs() < 0.01);

        for (position, label) in ["Field 1", "Field 2", "Field 3"].into_iter().enumerate() {
            renderer.field(position, label, "value").unwrap();
        }
        assert!(
            renderer.y_mm <= PAGE_HEIGHT_MM - MARGIN_MM,
            "fields end at {} mm",
            renderer.y_mm
        );

        let fresh = DocumentRenderer::new(None).unwrap();
        let records = [record(&path, "a", "b", "c")];
        let pages = read_pages(&render_collection(Box::new(fresh), &records).unwrap());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].texts, ["Field 1: a", "Field 2: b", "Field 3: c"]);
    }

    #[test]
    fn test_printed_size_keeps_aspect_ratio() {
        assert_eq!(printed_size(200, 100), (IMAGE_WIDTH_MM, 50.0));

        let (width, height) = printed_size(100, 1000);
        assert_eq!(height, MAX_IMAGE_HEIGHT_MM);
        assert!((width - MAX_IMAGE_HEIGHT_MM / 10.0).abs() < 0.01);
    }

    #[test]
    fn test_each_record_text_lands_on_its_own_page() {
        let dir = TempDir::new().unwrap();
        let photo = write_png(dir.path(), "photo.png", 40, 30);
        let records = vec![
            record(&dir.path().join("missing.png"), "first", "b", "c"),
            record(&photo, "second", "e", "f"),
        ];

        let renderer = DocumentRenderer::new(None).unwrap();
        let pages = read_pages(&render_collection(Box::new(renderer), &records).unwrap());
        assert_eq!(pages.len(), 2);

        assert_eq!(
            pages[0].texts,
            ["Image not found", "Field 1: first", "Field 2: b", "Field 3: c"]
        );
        assert!(!pages[0].operators.iter().any(|op| op == "Do"));

        assert_eq!(pages[1].texts, ["Field 1: second", "Field 2: e", "Field 3: f"]);
        assert!(pages[1].operators.iter().any(|op| op == "Do"), "image drawn on its page");
    }

    #[test]
    fn test_unreadable_font_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.ttf");
        let result = DocumentRenderer::new(Some(missing.as_path()));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
