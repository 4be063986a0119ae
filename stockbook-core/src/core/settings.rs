//! Where Stockbook keeps its data and writes its exports.
//!
//! Settings are stored as camelCase JSON. A missing or unreadable settings file
//! falls back to defaults rather than failing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the application data folder under the OS data directory.
pub const APP_FOLDER: &str = "WareHouse_Stock";
/// Record file name inside the data root.
pub const RECORD_FILE: &str = "data.csv";
/// Managed asset directory inside the data root.
pub const PICTURES_DIR: &str = "pics";

/// Persisted store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    /// Root folder holding the record file and the managed pictures.
    pub data_root: PathBuf,
    /// Folder the exported document and spreadsheet are written to.
    pub output_directory: PathBuf,
    /// TrueType font used for document text; built-in Helvetica when unset.
    pub pdf_font_path: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            output_directory: PathBuf::from("."),
            pdf_font_path: None,
        }
    }
}

impl StoreSettings {
    /// Settings rooted at `data_root`, exporting into the same folder.
    pub fn in_directory<P: Into<PathBuf>>(data_root: P) -> Self {
        let data_root = data_root.into();
        Self {
            output_directory: data_root.clone(),
            data_root,
            pdf_font_path: None,
        }
    }

    pub fn record_file(&self) -> PathBuf {
        self.data_root.join(RECORD_FILE)
    }

    pub fn pictures_dir(&self) -> PathBuf {
        self.data_root.join(PICTURES_DIR)
    }
}

/// Returns the default data root: `<OS data dir>/WareHouse_Stock`.
///
/// - Linux: `~/.local/share/WareHouse_Stock`
/// - macOS: `~/Library/Application Support/WareHouse_Stock`
/// - Windows: `%APPDATA%\WareHouse_Stock`
pub fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER)
}

/// Returns the default settings file: `<OS config dir>/stockbook/settings.json`.
pub fn settings_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockbook")
        .join("settings.json")
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings(path: &Path) -> StoreSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings {}: {e}", path.display());
            StoreSettings::default()
        }),
        Err(_) => StoreSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &StoreSettings) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| crate::StockbookError::Parse(format!("Failed to serialize settings: {e}")))?;
    fs::write(path, json)?;
    Ok(())
}
