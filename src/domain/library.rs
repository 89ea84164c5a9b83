//! File Library Engine: uploaded files with category tags and version chains.
//!
//! Each logical file carries an append-only list of versions starting at 1;
//! re-uploading the same logical file appends the next version. The version
//! list is never truncated.

use crate::domain::errors::ProjectError;
use crate::domain::types::{ContentRef, FileCategory, FileId, TimestampUtc};
use serde::{Deserialize, Serialize};

/// One entry in a file's version chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVersion {
    pub version: u32,
    pub content_ref: ContentRef,
    pub uploaded_at: TimestampUtc,
}

/// An uploaded file and its version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: FileId,
    pub name: String,
    pub category: FileCategory,
    pub uploaded_at: TimestampUtc,
    /// Append-only, ordered by version starting at 1.
    pub versions: Vec<FileVersion>,
}

impl UploadedFile {
    /// Returns the most recent version entry.
    pub fn latest_version(&self) -> Option<&FileVersion> {
        self.versions.last()
    }
}

/// The file library of one project, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileLibrary {
    files: Vec<UploadedFile>,
}

impl FileLibrary {
    /// Returns all files in upload order.
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Looks up a file by id.
    pub fn file(&self, id: &FileId) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.id == *id)
    }

    fn file_mut(&mut self, id: &FileId) -> Option<&mut UploadedFile> {
        self.files.iter_mut().find(|f| f.id == *id)
    }

    /// Looks up a file by id, failing with `NotFound` when unknown.
    pub fn require(&self, id: &FileId) -> Result<&UploadedFile, ProjectError> {
        self.file(id).ok_or_else(|| ProjectError::NotFound {
            message: format!("file {} does not exist in this project", id),
        })
    }

    /// Returns the version the next append to `id` will be assigned.
    pub fn next_version(&self, id: &FileId) -> Result<u32, ProjectError> {
        let file = self.require(id)?;
        Ok(file.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1)
    }

    /// Returns the files matching a category filter (`None` = all files),
    /// in stable upload order.
    pub fn files_by_category(&self, filter: Option<FileCategory>) -> Vec<&UploadedFile> {
        self.files
            .iter()
            .filter(|f| filter.is_none_or(|category| f.category == category))
            .collect()
    }

    // ========== Event application ==========

    pub(crate) fn apply_uploaded(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    pub(crate) fn apply_version_appended(&mut self, id: &FileId, entry: FileVersion) {
        if let Some(file) = self.file_mut(id) {
            file.versions.push(entry);
        }
    }
}
