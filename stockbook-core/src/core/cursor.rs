//! Which record is "current" while browsing the collection.
//!
//! [`NavigationCursor`] is pure state: it knows the collection length and an
//! optional index into it, and never touches storage. The invariant it keeps is
//! that `current` is `None` exactly when the length is zero, and otherwise a
//! valid index.

use crate::{Result, StockbookError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    current: Option<usize>,
    len: usize,
}

impl NavigationCursor {
    /// Creates a cursor for a collection of `len` records, pointing at the last one.
    pub fn new(len: usize) -> Self {
        let mut cursor = Self::default();
        cursor.initialize(len);
        cursor
    }

    /// Rebinds to a collection of `len` records and points at the most recent one.
    pub fn initialize(&mut self, len: usize) {
        self.len = len;
        self.current = len.checked_sub(1);
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Length of the collection the cursor is bound to.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Steps back one record.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::Boundary`] when there is no record, or the cursor
    /// is already on the first one.
    pub fn previous(&mut self) -> Result<usize> {
        match self.current {
            Some(index) if index > 0 => {
                self.current = Some(index - 1);
                log::debug!("Cursor moved back to {}", index - 1);
                Ok(index - 1)
            }
            _ => Err(StockbookError::Boundary("No previous record.".to_string())),
        }
    }

    /// Steps forward one record.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::Boundary`] when there is no record, or the cursor
    /// is already on the last one.
    pub fn next(&mut self) -> Result<usize> {
        match self.current {
            Some(index) if index + 1 < self.len => {
                self.current = Some(index + 1);
                log::debug!("Cursor moved forward to {}", index + 1);
                Ok(index + 1)
            }
            _ => Err(StockbookError::Boundary("No next record.".to_string())),
        }
    }

    /// Points the cursor at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::IndexOutOfRange`] if `index` is not a valid
    /// position in the bound collection.
    pub fn jump_to(&mut self, index: usize) -> Result<usize> {
        if index >= self.len {
            return Err(StockbookError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.current = Some(index);
        Ok(index)
    }

    /// Rebinds after a record was appended and points at it.
    pub fn on_append(&mut self, new_len: usize) -> Option<usize> {
        self.initialize(new_len);
        self.current
    }

    /// Re-bases the cursor after the record at `deleted` was removed, leaving
    /// `new_len` records.
    ///
    /// The cursor moves one step back from the deleted position, stopping at the
    /// first record, and becomes `None` once the collection is empty.
    pub fn on_deletion(&mut self, deleted: usize, new_len: usize) -> Option<usize> {
        self.len = new_len;
        self.current = match new_len {
            0 => None,
            _ => Some(deleted.saturating_sub(1).min(new_len - 1)),
        };
        self.current
    }
}
