use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    error::{Result, RoiError},
    store::RoiStore,
    types::Roi,
};

/// In-memory, name-keyed view over an ROI directory.
///
/// The directory stays the source of truth: `add` and `remove` hit the disk
/// first and only touch memory once the disk operation succeeded, so a failed
/// write leaves the in-memory set exactly as it was.
pub struct RoiIndex {
    store: RoiStore,
    rois: Vec<Roi>,
}

impl RoiIndex {
    /// Bind a new, empty index to `directory`. Nothing is loaded yet.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_store(RoiStore::new(directory))
    }

    pub fn with_store(store: RoiStore) -> Self {
        Self {
            store,
            rois: Vec::new(),
        }
    }

    /// Point the index at another directory, dropping everything in memory.
    pub fn bind(&mut self, directory: impl Into<PathBuf>) {
        let directory = directory.into();
        debug!(dir = %directory.display(), "Rebinding ROI index");
        self.store.set_directory(directory);
        self.rois.clear();
    }

    pub fn directory(&self) -> &Path {
        self.store.directory()
    }

    pub fn store(&self) -> &RoiStore {
        &self.store
    }

    /// Replace the in-memory set with every ROI in the directory.
    pub fn load_all(&mut self) -> Result<&[Roi]> {
        self.rois = self.store.load_all()?;
        info!(dir = %self.directory().display(), count = self.rois.len(), "Index loaded");
        Ok(&self.rois)
    }

    /// Load one ROI from disk into memory, replacing an entry with the same name.
    pub fn load_one(&mut self, name: &str) -> Result<Option<&Roi>> {
        let Some(roi) = self.store.load_one(name)? else {
            return Ok(None);
        };

        let slot = match self.position(name) {
            Some(i) => {
                self.rois[i] = roi;
                i
            }
            None => {
                self.rois.push(roi);
                self.rois.len() - 1
            }
        };
        Ok(Some(&self.rois[slot]))
    }

    pub fn get(&self, name: &str) -> Option<&Roi> {
        self.rois.iter().find(|roi| roi.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Persist `roi` and append it to the index.
    ///
    /// Names must be unique within the index; a second ROI with the same name
    /// is refused with [`RoiError::DuplicateName`] before anything is written.
    pub fn add(&mut self, roi: Roi) -> Result<()> {
        if self.contains(roi.name()) {
            return Err(RoiError::DuplicateName(roi.name().to_string()));
        }

        self.store.save(&roi)?;
        info!(name = %roi.name(), pixels = roi.len(), "Added ROI");
        self.rois.push(roi);
        Ok(())
    }

    /// Delete the ROI file and drop the entry from memory.
    ///
    /// Returns the removed in-memory entry, if there was one. Removing a name
    /// that exists neither on disk nor in memory is a no-op.
    pub fn remove(&mut self, name: &str) -> Result<Option<Roi>> {
        let deleted = self.store.delete(name)?;
        let removed = self.position(name).map(|i| self.rois.remove(i));
        info!(name = %name, deleted, in_memory = removed.is_some(), "Removed ROI");
        Ok(removed)
    }

    /// Names in memory order: directory order after `load_all`, then insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.rois.iter().map(|roi| roi.name()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Roi> {
        self.rois.iter()
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.rois.iter().position(|roi| roi.name() == name)
    }
}

impl<'a> IntoIterator for &'a RoiIndex {
    type Item = &'a Roi;
    type IntoIter = std::slice::Iter<'a, Roi>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
