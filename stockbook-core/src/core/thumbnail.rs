//! Image loading and proportional scaling shared by display and export.
//!
//! A record's image is either decoded successfully or replaced by a short
//! placeholder text; callers never see a decode failure as an error.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Bounding box used when showing a record's image on screen.
pub const DISPLAY_MAX_SIZE: (u32, u32) = (580, 500);

/// Placeholder shown when a record's image path does not name an existing file.
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Placeholder shown in place of an image when there is no current record.
pub const NO_RECORD: &str = "No record available.";

/// The outcome of resolving a record's image path.
#[derive(Debug, Clone)]
pub enum LoadedImage {
    Image(DynamicImage),
    /// The text to show instead of the image.
    Placeholder(String),
}

/// What the presentation layer should draw for the image area.
#[derive(Debug, Clone)]
pub enum Preview {
    /// A decoded image already fitted inside [`DISPLAY_MAX_SIZE`].
    Image(DynamicImage),
    Placeholder(String),
    /// The collection is empty.
    Empty,
}

impl Preview {
    /// Text to display when there is no image to draw.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Image(_) => None,
            Self::Placeholder(text) => Some(text.as_str()),
            Self::Empty => Some(NO_RECORD),
        }
    }
}

/// Loads the image at `path`, turning any failure into placeholder text.
pub fn load_image(path: &Path) -> LoadedImage {
    if !path.is_file() {
        return LoadedImage::Placeholder(IMAGE_NOT_FOUND.to_string());
    }
    match image::open(path) {
        Ok(img) => LoadedImage::Image(img),
        Err(e) => LoadedImage::Placeholder(format!("Error loading image: {e}")),
    }
}

/// Loads `path` and fits it inside [`DISPLAY_MAX_SIZE`] for on-screen display.
pub fn display_preview(path: &Path) -> Preview {
    match load_image(path) {
        LoadedImage::Image(img) => {
            let (max_w, max_h) = DISPLAY_MAX_SIZE;
            Preview::Image(fit_within(&img, max_w, max_h))
        }
        LoadedImage::Placeholder(text) => Preview::Placeholder(text),
    }
}

/// Shrinks `img` to fit inside `max_w` x `max_h`, keeping its aspect ratio.
///
/// Images that already fit are returned at their original size.
pub fn fit_within(img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max_w && h <= max_h {
        return img.clone();
    }
    img.resize(max_w, max_h, FilterType::Lanczos3)
}

/// Height of an image `w` x `h` scaled proportionally to `width`, truncated to
/// whole pixels and never below one.
pub fn proportional_height(w: u32, h: u32, width: u32) -> u32 {
    if w == 0 {
        return 1;
    }
    let scaled = u64::from(h) * u64::from(width) / u64::from(w);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Scales `img` up or down so its width is exactly `width`.
pub fn scale_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let width = width.max(1);
    if w == width {
        return img.clone();
    }
    img.resize_exact(width, proportional_height(w, h, width), FilterType::Lanczos3)
}
