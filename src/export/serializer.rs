//! Turns the current composition into a persisted [`MockupDescriptor`].
//!
//! Saving is split in three so the upload can leave the owning thread:
//!
//! - `ComposerSession::begin_save` renders and encodes synchronously, producing a
//!   [`SaveTicket`];
//! - [`SaveTicket::upload`] blocks on the image host and may run anywhere;
//! - `ComposerSession::finish_save` applies the [`UploadedSave`] back onto the session
//!   and the order draft.

use chrono::{DateTime, Utc};

use crate::composer::garment::GarmentState;
use crate::composer::geometry::GeometryState;
use crate::export::descriptor::MockupDescriptor;
use crate::export::inline::png_data_url;
use crate::export::upload::{ImageUploader, UploadedImage};
use crate::foundation::error::MockupResult;

pub const SAVED_NOTICE: &str = "Mockup saved successfully!";
pub const SAVED_LOCALLY_NOTICE: &str = "Mockup saved locally (upload failed)";

/// Progress of the most recent save on a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveState {
    #[default]
    Idle,
    /// An upload for the given session generation has not been applied yet.
    Uploading { generation: u64 },
    Done,
    FallbackDone,
}

/// A rendered, encoded mockup waiting to be uploaded.
///
/// Carries the garment and geometry exactly as they were when the save began, so edits
/// made while the upload runs do not leak into the descriptor.
#[derive(Clone, Debug)]
pub struct SaveTicket {
    pub(crate) generation: u64,
    pub(crate) png: Vec<u8>,
    pub(crate) garment: GarmentState,
    pub(crate) geometry: GeometryState,
}

impl SaveTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The exported PNG.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    #[tracing::instrument(skip(self, uploader), fields(generation = self.generation, len = self.png.len()))]
    pub fn upload(self, uploader: &dyn ImageUploader) -> UploadedSave {
        let result = uploader.upload(&self.png);
        UploadedSave {
            ticket: self,
            result,
            finished_at: Utc::now(),
        }
    }
}

/// A ticket whose upload attempt has finished, successfully or not.
#[derive(Debug)]
pub struct UploadedSave {
    pub(crate) ticket: SaveTicket,
    pub(crate) result: MockupResult<UploadedImage>,
    pub(crate) finished_at: DateTime<Utc>,
}

impl UploadedSave {
    pub fn generation(&self) -> u64 {
        self.ticket.generation
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// Build the descriptor, embedding the PNG inline when the upload failed.
    pub(crate) fn into_outcome(self) -> SaveOutcome {
        let Self {
            ticket,
            result,
            finished_at,
        } = self;
        let mut descriptor = MockupDescriptor {
            mockup_image_ref: String::new(),
            garment_color: ticket.garment.color,
            view_side: ticket.garment.view_side,
            geometry: ticket.geometry,
            uploaded_at: finished_at,
            external_asset_id: None,
            external_delete_ref: None,
        };
        match result {
            Ok(hosted) => {
                descriptor.mockup_image_ref = hosted.url;
                descriptor.external_asset_id = hosted.asset_id;
                descriptor.external_delete_ref = hosted.delete_ref;
                SaveOutcome::Uploaded(descriptor)
            }
            Err(err) => {
                tracing::warn!(%err, "mockup upload failed; storing inline copy");
                descriptor.mockup_image_ref = png_data_url(&ticket.png);
                SaveOutcome::SavedLocally(descriptor)
            }
        }
    }
}

/// Result of applying a finished save.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveOutcome {
    /// Hosted image; the descriptor references its public URL.
    Uploaded(MockupDescriptor),
    /// Upload failed; the descriptor embeds the PNG as a data URL.
    SavedLocally(MockupDescriptor),
    /// The session was reset while the upload ran. Nothing was written.
    Discarded,
}

impl SaveOutcome {
    pub fn descriptor(&self) -> Option<&MockupDescriptor> {
        match self {
            Self::Uploaded(d) | Self::SavedLocally(d) => Some(d),
            Self::Discarded => None,
        }
    }

    /// User-facing notice for the outcome.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Uploaded(_) => Some(SAVED_NOTICE),
            Self::SavedLocally(_) => Some(SAVED_LOCALLY_NOTICE),
            Self::Discarded => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/serializer.rs"]
mod tests;
