//! Draft Gallery Engine: the ordered draft versions of one project.
//!
//! Version numbers are engine-assigned, unique and strictly increasing per
//! project; callers never supply them. Locked drafts are hidden from the
//! client-facing view but remain visible to the editor.

use crate::domain::errors::ProjectError;
use crate::domain::types::{DraftId, MediaRef, Role, TimestampUtc};
use serde::{Deserialize, Serialize};

/// A single draft version in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    /// Strictly increasing per project, starting at 1.
    pub version: u32,
    pub media_ref: MediaRef,
    /// Hides the draft from the client-facing view while true.
    pub locked: bool,
    pub created_at: TimestampUtc,
}

/// The draft gallery of one project, in version order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftGallery {
    drafts: Vec<Draft>,
}

impl DraftGallery {
    /// Returns all drafts regardless of lock state.
    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Looks up a draft by id.
    pub fn draft(&self, id: &DraftId) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.id == *id)
    }

    fn draft_mut(&mut self, id: &DraftId) -> Option<&mut Draft> {
        self.drafts.iter_mut().find(|d| d.id == *id)
    }

    /// Looks up a draft by id, failing with `NotFound` when unknown.
    pub fn require(&self, id: &DraftId) -> Result<&Draft, ProjectError> {
        self.draft(id).ok_or_else(|| ProjectError::NotFound {
            message: format!("draft {} does not exist in this project", id),
        })
    }

    /// Returns the version the next `AddDraft` will be assigned.
    ///
    /// Drafts are never removed, so max + 1 is gap-free as long as commands
    /// on one project are serialized (which the project actor guarantees).
    pub fn next_version(&self) -> u32 {
        self.drafts.iter().map(|d| d.version).max().unwrap_or(0) + 1
    }

    /// Returns the drafts visible to the given viewer role: locked drafts
    /// are filtered out for clients and visible to everyone else.
    pub fn visible_drafts(&self, viewer_role: Role) -> Vec<&Draft> {
        self.drafts
            .iter()
            .filter(|d| viewer_role != Role::Client || !d.locked)
            .collect()
    }

    // ========== Event application ==========

    pub(crate) fn apply_added(&mut self, draft: Draft) {
        self.drafts.push(draft);
    }

    pub(crate) fn apply_lock_toggled(&mut self, id: &DraftId, locked: bool) {
        if let Some(draft) = self.draft_mut(id) {
            draft.locked = locked;
        }
    }
}
