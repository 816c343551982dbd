use chrono::{DateTime, Utc};

use crate::composer::garment::{GarmentColor, ViewSide};
use crate::composer::geometry::GeometryState;

/// Persisted record of one saved mockup.
///
/// Written once per successful save and never mutated afterwards; a later save produces
/// a new descriptor that replaces this one on the order draft.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupDescriptor {
    /// Public URL of the uploaded PNG, or an inline `data:` URL when the upload failed.
    pub mockup_image_ref: String,
    pub garment_color: GarmentColor,
    pub view_side: ViewSide,
    /// Placement at the moment `save` was invoked.
    pub geometry: GeometryState,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_delete_ref: Option<String>,
}

impl MockupDescriptor {
    /// `true` when the image is embedded rather than hosted.
    pub fn is_inline(&self) -> bool {
        self.mockup_image_ref.starts_with("data:")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/descriptor.rs"]
mod tests;
