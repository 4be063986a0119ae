//! Core library for Stockbook, a personal record book that pairs three text
//! fields with a photo.
//!
//! The primary entry point is [`Session`], which owns the ordered record
//! collection persisted as CSV, the browsing cursor, and the managed picture
//! folder. All mutations go through `Session` methods; the building blocks are
//! public so they can be used and tested on their own.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    asset::AssetManager,
    cursor::NavigationCursor,
    error::{Result, StockbookError},
    export::{
        render_collection, DocumentRenderer, ExportEngine, ExportError, ExportFormat,
        RecordRenderer, SpreadsheetRenderer,
    },
    record::{Record, RecordFields, RECORD_COLUMNS},
    session::Session,
    settings::{load_settings, save_settings, settings_file_path, StoreSettings},
    storage::RecordStore,
    thumbnail::{LoadedImage, Preview},
};
