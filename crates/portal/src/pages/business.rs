//! Business detail page: owner editing and reviews.
//!
//! The page holds the confirmed business inside a [`BusinessEditor`], the
//! review list and the review form. The viewer is passed in on every call
//! from the live session, so signing out mid-edit immediately hides the
//! owner controls.

use std::sync::Arc;

use tracing::instrument;

use sol_city_core::editor::{BusinessEditor, EditorControls, EditorMode};
use sol_city_core::records::{Business, BusinessPatch, Identity, NewReview, Profile, Review};
use sol_city_core::reviews::{self, ReviewForm};
use sol_city_core::types::{BusinessId, UserId};

use crate::backend::{
    BackendError, Direction, Query, RecordStore, Table, insert_row, select_by_id, select_rows,
    update_row,
};
use crate::error::{AuthorizationError, PortalError, Result};
use crate::pages::Completed;

/// Controller for one business page.
pub struct BusinessPage {
    store: Arc<dyn RecordStore>,
    editor: BusinessEditor,
    reviews: Vec<Review>,
    form: ReviewForm,
}

impl std::fmt::Debug for BusinessPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessPage")
            .field("business", &self.editor.confirmed().id)
            .field("reviews", &self.reviews.len())
            .finish_non_exhaustive()
    }
}

impl BusinessPage {
    /// Load the business and its reviews.
    ///
    /// A failure to load reviews is logged and leaves the list empty; the
    /// business itself is still shown.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such business is visible, or the backend
    /// error if the business query fails.
    #[instrument(skip(store))]
    pub async fn load(store: Arc<dyn RecordStore>, id: BusinessId) -> Result<Self> {
        let business: Business = select_by_id(store.as_ref(), Table::Businesses, id.as_uuid())
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("business {id}")))?;

        let mut page = Self {
            store,
            editor: BusinessEditor::new(business),
            reviews: Vec::new(),
            form: ReviewForm::default(),
        };
        if let Err(e) = page.refresh_reviews().await {
            PortalError::from(e).report();
        }
        Ok(page)
    }

    /// The last confirmed business record.
    #[must_use]
    pub const fn business(&self) -> &Business {
        self.editor.confirmed()
    }

    #[must_use]
    pub const fn editor(&self) -> &BusinessEditor {
        &self.editor
    }

    #[must_use]
    pub fn can_edit(&self, viewer: Option<UserId>) -> bool {
        self.editor.can_edit(viewer)
    }

    #[must_use]
    pub fn controls(&self, viewer: Option<UserId>) -> EditorControls {
        self.editor.controls(viewer)
    }

    #[must_use]
    pub fn mode(&self, viewer: Option<UserId>) -> EditorMode {
        self.editor.mode(viewer)
    }

    /// Enter edit mode; a no-op returning `false` for anyone but the owner.
    pub fn begin_edit(&mut self, viewer: Option<UserId>) -> bool {
        self.editor.begin_edit(viewer)
    }

    /// Edit buffer, available only to the owner while editing.
    pub fn buffer_mut(&mut self, viewer: Option<UserId>) -> Option<&mut BusinessPatch> {
        self.editor.buffer_mut(viewer)
    }

    /// Send the edit buffer in a single update.
    ///
    /// The confirmed record changes only after the backend accepted the
    /// update; on any error the page stays in edit mode with the buffer
    /// intact.
    ///
    /// # Errors
    ///
    /// `Authorization(NotOwner)` for non-owners, `Validation` when not
    /// editing or the name is blank, `Backend` if the update fails.
    #[instrument(skip(self), fields(business_id = %self.business().id))]
    pub async fn save(&mut self, viewer: Option<UserId>) -> Result<()> {
        let patch = self.editor.prepare_save(viewer)?;
        update_row(
            self.store.as_ref(),
            Table::Businesses,
            self.business().id.as_uuid(),
            &patch,
        )
        .await?;
        self.editor.commit(patch);
        tracing::info!("Business updated");
        Ok(())
    }

    /// Drop the edit buffer without a backend call.
    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    /// Reload the business from the backend. An open edit keeps its buffer.
    ///
    /// # Errors
    ///
    /// `NotFound` if the business disappeared, `Backend` on query failure.
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.business().id;
        let business: Business = select_by_id(self.store.as_ref(), Table::Businesses, id.as_uuid())
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("business {id}")))?;
        self.editor.refresh(business);
        Ok(())
    }

    /// Reviews, newest first.
    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    #[must_use]
    pub fn average_rating(&self) -> f64 {
        reviews::average(&self.reviews)
    }

    /// Average rating for display, e.g. `4.3`.
    #[must_use]
    pub fn average_label(&self) -> String {
        reviews::format_average(&self.reviews)
    }

    #[must_use]
    pub const fn review_form(&self) -> &ReviewForm {
        &self.form
    }

    pub const fn review_form_mut(&mut self) -> &mut ReviewForm {
        &mut self.form
    }

    /// Reload the review list. The current list is kept on failure.
    ///
    /// # Errors
    ///
    /// Returns error if the reviews query fails.
    pub async fn refresh_reviews(&mut self) -> std::result::Result<(), BackendError> {
        let query = Query::new()
            .eq("business_id", self.business().id)
            .order_by("created_at", Direction::Descending);
        self.reviews = select_rows(self.store.as_ref(), Table::Reviews, &query).await?;
        Ok(())
    }

    /// Submit the review form as `viewer`.
    ///
    /// The reviewer name comes from the viewer's profile, falling back to
    /// "Anonymous". The form resets and closes only after the insert
    /// succeeded; the list is then reloaded.
    ///
    /// # Errors
    ///
    /// `Authorization(AuthenticationRequired)` without a viewer (nothing is
    /// sent), `Backend` if the insert fails (form left as it was).
    #[instrument(skip(self, viewer), fields(business_id = %self.business().id))]
    pub async fn submit_review(&mut self, viewer: Option<&Identity>) -> Result<Completed> {
        let identity = viewer.ok_or(AuthorizationError::AuthenticationRequired)?;

        let reviewer_name = self.reviewer_name(identity).await;
        let review = NewReview {
            business_id: self.business().id,
            user_id: identity.id,
            rating: self.form.rating,
            comment: self.form.comment(),
            reviewer_name,
        };
        insert_row(self.store.as_ref(), Table::Reviews, &review).await?;

        tracing::info!(rating = %review.rating, "Review submitted");
        self.form.reset();

        Ok(Completed::after_refresh(self.refresh_reviews().await))
    }

    async fn reviewer_name(&self, identity: &Identity) -> String {
        match select_by_id::<Profile>(self.store.as_ref(), Table::Profiles, identity.id.as_uuid()).await {
            Ok(Some(profile)) => profile.reviewer_name().to_string(),
            Ok(None) => Profile::ANONYMOUS.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Profile lookup failed, reviewing anonymously");
                Profile::ANONYMOUS.to_string()
            }
        }
    }
}
