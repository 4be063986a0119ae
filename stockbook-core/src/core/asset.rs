//! Importing user-supplied images into the managed asset directory.

use crate::core::thumbnail::{self, Preview};
use crate::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Copies external images into a managed directory under generated names.
///
/// Every import produces a new file, even for the same source; each import is
/// a separate attachment. Assets are never deleted by the manager.
#[derive(Debug, Clone)]
pub struct AssetManager {
    directory: PathBuf,
}

impl AssetManager {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The managed directory assets are copied into.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Copies `source` into the managed directory and returns the new path.
    ///
    /// The file is named by a fresh UUID followed by the source's original
    /// extension, and its bytes are copied verbatim. The directory is created if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StockbookError::Io`] if `source` cannot be read or the
    /// managed directory cannot be written. Nothing is left behind on failure.
    pub fn import<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf> {
        let source = source.as_ref();
        let mut input = File::open(source)?;
        fs::create_dir_all(&self.directory)?;

        let mut staged = NamedTempFile::new_in(&self.directory)?;
        io::copy(&mut input, staged.as_file_mut())?;
        staged.as_file_mut().sync_all()?;

        let target = self.directory.join(asset_file_name(source));
        staged.persist_noclobber(&target)?;

        log::info!("Imported {} as {}", source.display(), target.display());
        Ok(target)
    }

    /// Loads an imported image scaled for display, or a placeholder if it cannot
    /// be read.
    pub fn preview<P: AsRef<Path>>(&self, path: P) -> Preview {
        thumbnail::display_preview(path.as_ref())
    }
}

/// Generates a collision-free file name that keeps `source`'s extension.
fn asset_file_name(source: &Path) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    match source.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem,
    }
}
