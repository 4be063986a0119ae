//! The operations the presentation layer calls.

use crate::core::asset::AssetManager;
use crate::core::cursor::NavigationCursor;
use crate::core::export::{ExportEngine, ExportFormat};
use crate::core::record::{Record, RecordFields};
use crate::core::settings::StoreSettings;
use crate::core::storage::RecordStore;
use crate::core::thumbnail::{self, Preview};
use crate::{Result, StockbookError};
use std::fs;
use std::path::{Path, PathBuf};

/// An open record book: the persisted collection, the browsing cursor, and the
/// managed picture folder.
///
/// There is no locking of any kind. A `Session` assumes it is the only writer of
/// its record file; a caller sharing one between threads must wrap it in a
/// `Mutex`, and two sessions on the same file will overwrite each other.
#[derive(Debug)]
pub struct Session {
    settings: StoreSettings,
    store: RecordStore,
    assets: AssetManager,
    cursor: NavigationCursor,
    exporter: ExportEngine,
}

impl Session {
    /// Opens the record file named by `settings` and points the cursor at the
    /// most recently added record.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::Parse`] if the record file is malformed, or
    /// [`StockbookError::Io`] if it cannot be read.
    pub fn open(settings: StoreSettings) -> Result<Self> {
        let store = RecordStore::open(settings.record_file())?;
        let assets = AssetManager::new(settings.pictures_dir());
        let cursor = NavigationCursor::new(store.len());
        let exporter = ExportEngine::new().with_font(settings.pdf_font_path.clone());
        Ok(Self {
            settings,
            store,
            assets,
            cursor,
            exporter,
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    /// Re-reads the record file and resets the cursor to the last record.
    pub fn load_collection(&mut self) -> Result<&[Record]> {
        let len = self.store.load()?.len();
        self.cursor.initialize(len);
        Ok(self.store.records())
    }

    /// Replaces the whole collection and resets the cursor to the last record.
    pub fn save_collection(&mut self, records: Vec<Record>) -> Result<()> {
        self.store.save_all(records)?;
        self.cursor.initialize(self.store.len());
        Ok(())
    }

    /// Copies an image into the managed picture folder, returning its new path.
    pub fn import_image<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf> {
        self.assets.import(source)
    }

    /// Preview of an image chosen in input mode.
    pub fn image_preview<P: AsRef<Path>>(&self, path: P) -> Preview {
        self.assets.preview(path)
    }

    /// Imports `image_source`, appends a record for it, and makes it current.
    ///
    /// If persisting the record fails, the freshly imported copy is removed
    /// again so a failed save leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::ValidationFailed`] when no image is given, and
    /// [`StockbookError::Io`] if the import or the save fails.
    pub fn append_record(
        &mut self,
        fields: RecordFields,
        image_source: Option<&Path>,
    ) -> Result<usize> {
        let source = image_source
            .ok_or_else(|| StockbookError::ValidationFailed("Please select an image.".to_string()))?;
        let imported = self.assets.import(source)?;
        let record = fields.into_record(imported.to_string_lossy().into_owned());

        match self.append_imported(record) {
            Ok(index) => Ok(index),
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&imported) {
                    log::warn!("Could not remove {}: {cleanup}", imported.display());
                }
                Err(e)
            }
        }
    }

    /// Appends a record whose image is already in the managed folder and makes
    /// it current.
    pub fn append_imported(&mut self, record: Record) -> Result<usize> {
        let index = self.store.append(record)?;
        self.cursor.on_append(self.store.len());
        self.cursor.jump_to(index)
    }

    /// Deletes the record at `index` and moves the cursor one record back.
    ///
    /// The record's image file stays in the picture folder.
    pub fn delete_record(&mut self, index: usize) -> Result<Option<usize>> {
        self.store.delete_at(index)?;
        let current = self.cursor.on_deletion(index, self.store.len());
        log::info!("Deleted record {index}; {} remain", self.store.len());
        Ok(current)
    }

    /// Deletes the record under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::IndexOutOfRange`] when there is no record.
    pub fn delete_current(&mut self) -> Result<Option<usize>> {
        let index = self
            .cursor
            .current()
            .ok_or(StockbookError::IndexOutOfRange { index: 0, len: 0 })?;
        self.delete_record(index)
    }

    pub fn cursor_previous(&mut self) -> Result<&Record> {
        let index = self.cursor.previous()?;
        self.record_at(index)
    }

    pub fn cursor_next(&mut self) -> Result<&Record> {
        let index = self.cursor.next()?;
        self.record_at(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor.current()
    }

    pub fn current_record(&self) -> Option<&Record> {
        self.cursor.current().and_then(|index| self.store.get(index))
    }

    /// The current record's image fitted for display, or what to show instead.
    pub fn current_preview(&self) -> Preview {
        match self.current_record() {
            Some(record) => thumbnail::display_preview(Path::new(&record.image_path)),
            None => Preview::Empty,
        }
    }

    /// Writes `records.pdf` into the output directory and returns its path.
    pub fn export_document(&self) -> Result<PathBuf> {
        self.export(ExportFormat::Document)
    }

    /// Writes `records.xlsx` into the output directory and returns its path.
    pub fn export_spreadsheet(&self) -> Result<PathBuf> {
        self.export(ExportFormat::Spreadsheet)
    }

    fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        Ok(self
            .exporter
            .write(format, self.store.records(), &self.settings.output_directory)?)
    }

    fn record_at(&self, index: usize) -> Result<&Record> {
        self.store.get(index).ok_or(StockbookError::IndexOutOfRange {
            index,
            len: self.store.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::tests::write_png;
    use tempfile::TempDir;

    fn open_in(dir: &TempDir) -> Session {
        Session::open(StoreSettings::in_directory(dir.path().join("stock"))).unwrap()
    }

    fn add(session: &mut Session, dir: &TempDir, label: &str) -> usize {
        let source = write_png(dir.path(), &format!("{label}.png"), 60, 40);
        session
            .append_record(RecordFields::new(label, "", ""), Some(source.as_path()))
            .unwrap()
    }

    #[test]
    fn test_open_empty_store() {
        let dir = TempDir::new().unwrap();
        let session = open_in(&dir);
        assert!(session.records().is_empty());
        assert_eq!(session.current_index(), None);
        assert!(session.current_record().is_none());
        assert!(matches!(session.current_preview(), Preview::Empty));
    }

    #[test]
    fn test_append_record_requires_image() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        let err = session
            .append_record(RecordFields::new("a", "b", "c"), None)
            .unwrap_err();
        assert_eq!(err.user_message(), "Please select an image.");
        assert!(!session.settings().record_file().exists());
    }

    #[test]
    fn test_append_imports_and_moves_cursor() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        assert_eq!(add(&mut session, &dir, "first"), 0);
        assert_eq!(add(&mut session, &dir, "second"), 1);

        let current = session.current_record().unwrap();
        assert_eq!(current.field1, "second");
        let image = Path::new(&current.image_path);
        assert_eq!(image.parent().unwrap(), session.settings().pictures_dir());
        assert!(matches!(session.current_preview(), Preview::Image(_)));
    }

    #[test]
    fn test_reopen_starts_at_latest_record() {
        let dir = TempDir::new().unwrap();
        {
            let mut session = open_in(&dir);
            for label in ["a", "b", "c"] {
                add(&mut session, &dir, label);
            }
        }
        let mut session = open_in(&dir);
        assert_eq!(session.current_index(), Some(2));
        assert_eq!(session.cursor_previous().unwrap().field1, "b");
        assert_eq!(session.cursor_previous().unwrap().field1, "a");
        assert!(matches!(session.cursor_previous(), Err(StockbookError::Boundary(_))));
        assert_eq!(session.cursor_next().unwrap().field1, "b");
    }

    #[test]
    fn test_delete_rebases_and_keeps_image() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        for label in ["a", "b", "c"] {
            add(&mut session, &dir, label);
        }
        session.cursor_previous().unwrap();
        let image = PathBuf::from(&session.current_record().unwrap().image_path);

        assert_eq!(session.delete_current().unwrap(), Some(0));
        assert_eq!(session.current_record().unwrap().field1, "a");
        assert!(image.exists(), "deleting a record keeps its picture");

        assert_eq!(session.delete_record(0).unwrap(), Some(0));
        assert_eq!(session.current_record().unwrap().field1, "c");
        assert_eq!(session.delete_current().unwrap(), None);
        assert!(matches!(
            session.delete_current(),
            Err(StockbookError::IndexOutOfRange { .. })
        ));
        assert!(open_in(&dir).records().is_empty());
    }

    #[test]
    fn test_save_collection_resets_cursor() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        let records = vec![
            RecordFields::new("x", "", "").into_record("/a.png"),
            RecordFields::new("y", "", "").into_record("/b.png"),
        ];
        session.save_collection(records.clone()).unwrap();
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.load_collection().unwrap(), records.as_slice());
    }

    #[test]
    fn test_failed_append_removes_imported_copy() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        add(&mut session, &dir, "kept");

        // Replace the record file with a directory so the next save cannot persist.
        let record_file = session.settings().record_file();
        fs::remove_file(&record_file).unwrap();
        fs::create_dir(&record_file).unwrap();

        let source = write_png(dir.path(), "lost.png", 10, 10);
        let result = session.append_record(RecordFields::new("lost", "", ""), Some(source.as_path()));
        assert!(matches!(result, Err(StockbookError::Io(_))));
        assert_eq!(session.records().len(), 1);
        assert_eq!(fs::read_dir(session.settings().pictures_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_exports_land_in_output_directory() {
        let dir = TempDir::new().unwrap();
        let mut session = open_in(&dir);
        assert!(matches!(
            session.export_document(),
            Err(StockbookError::Export(crate::ExportError::NoRecords))
        ));

        add(&mut session, &dir, "a");
        session
            .save_collection(vec![
                session.records()[0].clone(),
                RecordFields::new("b", "", "").into_record("/no/such/file.png"),
            ])
            .unwrap();

        let pdf = session.export_document().unwrap();
        let xlsx = session.export_spreadsheet().unwrap();
        assert_eq!(pdf, session.settings().output_directory.join("records.pdf"));
        assert_eq!(xlsx, session.settings().output_directory.join("records.xlsx"));
        assert!(fs::read(pdf).unwrap().starts_with(b"%PDF-"));
        assert!(fs::read(xlsx).unwrap().starts_with(b"PK"));
    }
}
