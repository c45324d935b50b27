//! Owns the file collection and the viewer, and keeps them consistent.
//!
//! Every collection mutation re-validates the viewer in the same call, so the
//! viewer never points past the end of the collection.

use crate::error::Result;
use crate::file_record::{FileRecord, FileSource};
use crate::file_store::FileStore;
use crate::preview::PreviewHost;
use crate::viewer::{ViewerCommand, ViewerState};

pub struct Gallery<H: PreviewHost> {
    store: FileStore<H>,
    viewer: ViewerState,
}

impl<H: PreviewHost> Gallery<H> {
    pub fn new(previews: H) -> Self {
        Self {
            store: FileStore::new(previews),
            viewer: ViewerState::default(),
        }
    }

    pub fn records(&self) -> &[FileRecord] {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn previews(&self) -> &H {
        self.store.previews()
    }

    pub fn previews_mut(&mut self) -> &mut H {
        self.store.previews_mut()
    }

    /// The record the viewer shows, or None when closed. Callers render nothing
    /// when this is None.
    pub fn current_record(&self) -> Option<&FileRecord> {
        self.viewer
            .current_index()
            .and_then(|index| self.store.get_by_index(index))
    }

    pub fn add_files<I>(&mut self, sources: I) -> Vec<String>
    where
        I: IntoIterator<Item = FileSource>,
    {
        self.store.add_files(sources)
    }

    /// Removes a record and moves the viewer off it if it was in view.
    pub fn remove_file(&mut self, id: &str) -> bool {
        match self.store.remove_file(id) {
            Some(index) => {
                self.viewer.record_removed(index, self.store.len());
                true
            }
            None => false,
        }
    }

    pub fn reorder_files(&mut self, from: usize, to: usize) -> Result<()> {
        self.store.reorder_files(from, to)?;
        if from != to {
            self.viewer.record_moved(from, to, self.store.len());
        }
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.viewer.close();
    }

    /// Opens the viewer on `index`. Indices outside the collection are ignored.
    pub fn open_viewer(&mut self, index: usize) {
        if index < self.store.len() {
            self.viewer.open(index);
        } else {
            log::warn!("ignoring open at {index}, only {} file(s)", self.store.len());
        }
    }

    pub fn viewer_command(&mut self, command: ViewerCommand) {
        if let ViewerCommand::Open(index) = command {
            self.open_viewer(index);
        } else {
            self.viewer.apply(command, self.store.len());
        }
    }
}
