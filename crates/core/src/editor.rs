//! Ownership-gated editing of a business listing.
//!
//! ```text
//!            begin_edit (owner only)
//!   Viewing ─────────────────────────► Editing
//!      ▲                                 │
//!      ├──────── cancel ─────────────────┤
//!      └──── commit (after backend OK) ──┘
//! ```
//!
//! The editor never talks to the backend. Callers take the patch from
//! [`BusinessEditor::prepare_save`], send it, and call
//! [`BusinessEditor::commit`] only once the update succeeded. Ownership is
//! checked against the viewer passed in on every call, never remembered.

use crate::records::{Business, BusinessPatch};
use crate::types::UserId;

/// Errors raised by editor transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// The viewer does not own the listing (or is signed out).
    #[error("only the owner can edit this business")]
    NotOwner,

    /// Save was requested while not editing.
    #[error("not currently editing")]
    NotEditing,

    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Viewing,
    Editing,
}

/// Which controls the page shows for a given viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorControls {
    /// Viewer is not the owner: no edit controls at all.
    Hidden,
    /// Owner, viewing: show "Edit Business".
    Edit,
    /// Owner, editing: show "Save" and "Cancel".
    SaveCancel,
}

/// View/edit state for one business.
#[derive(Debug, Clone)]
pub struct BusinessEditor {
    confirmed: Business,
    buffer: BusinessPatch,
    mode: EditorMode,
}

impl BusinessEditor {
    /// Start in `Viewing` with the buffer mirroring `business`.
    #[must_use]
    pub fn new(business: Business) -> Self {
        let buffer = business.patch();
        Self {
            confirmed: business,
            buffer,
            mode: EditorMode::Viewing,
        }
    }

    /// The last record confirmed by the backend.
    #[must_use]
    pub const fn confirmed(&self) -> &Business {
        &self.confirmed
    }

    /// The edit buffer (an owned copy of the editable fields).
    #[must_use]
    pub const fn buffer(&self) -> &BusinessPatch {
        &self.buffer
    }

    /// Mutable access to the buffer, only while editing as the owner.
    pub fn buffer_mut(&mut self, viewer: Option<UserId>) -> Option<&mut BusinessPatch> {
        (self.mode(viewer) == EditorMode::Editing).then_some(&mut self.buffer)
    }

    #[must_use]
    pub fn can_edit(&self, viewer: Option<UserId>) -> bool {
        self.confirmed.is_owned_by(viewer)
    }

    /// Effective mode for `viewer`.
    ///
    /// A viewer who no longer owns the record (e.g. signed out mid-edit)
    /// always sees `Viewing`.
    #[must_use]
    pub fn mode(&self, viewer: Option<UserId>) -> EditorMode {
        if self.can_edit(viewer) {
            self.mode
        } else {
            EditorMode::Viewing
        }
    }

    #[must_use]
    pub fn controls(&self, viewer: Option<UserId>) -> EditorControls {
        match (self.can_edit(viewer), self.mode) {
            (false, _) => EditorControls::Hidden,
            (true, EditorMode::Viewing) => EditorControls::Edit,
            (true, EditorMode::Editing) => EditorControls::SaveCancel,
        }
    }

    /// Enter `Editing`. Returns whether the transition happened; a non-owner
    /// leaves the state untouched.
    pub fn begin_edit(&mut self, viewer: Option<UserId>) -> bool {
        if !self.can_edit(viewer) {
            return false;
        }
        self.mode = EditorMode::Editing;
        true
    }

    /// Check that a save may be sent and return the patch to send.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotOwner`] for a non-owner, [`EditorError::NotEditing`]
    /// outside `Editing`, [`EditorError::MissingField`] if the name is blank.
    pub fn prepare_save(&self, viewer: Option<UserId>) -> Result<BusinessPatch, EditorError> {
        if !self.can_edit(viewer) {
            return Err(EditorError::NotOwner);
        }
        if self.mode != EditorMode::Editing {
            return Err(EditorError::NotEditing);
        }
        if self.buffer.name.trim().is_empty() {
            return Err(EditorError::MissingField("name"));
        }
        Ok(self.buffer.clone())
    }

    /// Record a successful update: the confirmed record takes `saved` and
    /// the editor returns to `Viewing`.
    pub fn commit(&mut self, saved: BusinessPatch) {
        self.confirmed.apply(saved);
        self.buffer = self.confirmed.patch();
        self.mode = EditorMode::Viewing;
    }

    /// Discard the buffer and return to `Viewing`.
    pub fn cancel(&mut self) {
        self.buffer = self.confirmed.patch();
        self.mode = EditorMode::Viewing;
    }

    /// Replace the confirmed record with a fresh copy from the backend.
    ///
    /// An in-progress edit keeps its buffer.
    pub fn refresh(&mut self, business: Business) {
        self.confirmed = business;
        if self.mode == EditorMode::Viewing {
            self.buffer = self.confirmed.patch();
        }
    }
}
