//! Ordered collection of uploaded files and the lifecycle of their previews.
//!
//! Every record owns exactly one preview handle from the moment it is added until
//! it leaves the collection through `remove_file` or `clear_all`, at which point the
//! handle is revoked through the `PreviewHost`. Reordering never touches handles.

use crate::error::{GalleryError, Result};
use crate::file_record::{FileRecord, FileSource};
use crate::preview::PreviewHost;

/// Manages the file collection with operations for lookup, intake, removal, and ordering.
pub struct FileStore<H: PreviewHost> {
    records: Vec<FileRecord>,
    previews: H,
}

impl<H: PreviewHost> FileStore<H> {
    /// Creates an empty store that issues previews through `previews`.
    pub fn new(previews: H) -> Self {
        Self {
            records: Vec::new(),
            previews,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Collection Access
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns all records in display order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the index of a record by its ID, or None if not found.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }

    pub fn previews(&self) -> &H {
        &self.previews
    }

    pub fn previews_mut(&mut self) -> &mut H {
        &mut self.previews
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Appends one record per source, preserving input order. Identical names are
    /// not deduplicated. Returns the IDs of the new records.
    pub fn add_files<I>(&mut self, sources: I) -> Vec<String>
    where
        I: IntoIterator<Item = FileSource>,
    {
        let added_at_ms = chrono::Utc::now().timestamp_millis();
        let mut ids = Vec::new();

        for source in sources {
            let preview = self.previews.create(&source);
            let record = FileRecord::new(source, preview, added_at_ms);
            ids.push(record.id.clone());
            self.records.push(record);
        }

        log::info!("added {} file(s), {} total", ids.len(), self.records.len());
        ids
    }

    /// Removes a record by its ID and revokes its preview. Returns the index the
    /// record occupied, or None if no record matched.
    pub fn remove_file(&mut self, id: &str) -> Option<usize> {
        let index = self.index_of(id)?;
        let record = self.records.remove(index);
        self.previews.revoke(&record.preview);
        log::info!("removed {} at index {index}", record.name);
        Some(index)
    }

    /// Moves the record at `from` so that it ends up at `to`, where `to` is measured
    /// against the collection after the record has been taken out.
    pub fn reorder_files(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.records.len();
        if from >= len || to >= len {
            return Err(GalleryError::ReorderOutOfRange { from, to, len });
        }
        if from == to {
            return Ok(());
        }

        let record = self.records.remove(from);
        self.records.insert(to, record);
        log::debug!("moved file {from} -> {to}");
        Ok(())
    }

    /// Revokes every preview and empties the collection. Returns how many records
    /// were dropped.
    pub fn clear_all(&mut self) -> usize {
        let count = self.records.len();
        for record in self.records.drain(..) {
            self.previews.revoke(&record.preview);
        }
        log::info!("cleared {count} file(s)");
        count
    }
}
