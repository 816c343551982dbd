//! Garment mockup composer.
//!
//! A customer uploads a PNG/JPEG design, drags and resizes it over a recolorable garment
//! and saves the result as an order-ready mockup. The public API is session-oriented:
//!
//! - Build a [`ComposerSession`] from a [`ComposerConfig`]
//! - Load a design and feed it [`PointerEvent`]s; render frames with [`RenderMode::Interactive`]
//! - Save through an [`ImageUploader`] into an [`OrderDraft`], then [`submit_order`] into a
//!   [`RecordStore`]
#![forbid(unsafe_code)]

mod assets;
mod composer;
mod config;
mod export;
mod foundation;
mod render;
mod store;

pub use crate::assets::decode::{MAX_DESIGN_BYTES, decode_design, decode_image, load_image_file};
pub use crate::assets::store::{DesignAsset, DesignFormat, PreparedImage};
pub use crate::composer::garment::{GarmentColor, GarmentState, ViewSide};
pub use crate::composer::geometry::GeometryState;
pub use crate::composer::interaction::{
    Action, InteractionLimits, InteractionState, PointerController, PointerEvent,
};
pub use crate::composer::schedule::FrameScheduler;
pub use crate::composer::session::ComposerSession;
pub use crate::config::{ComposerConfig, UPLOAD_API_KEY_ENV, UploadConfig};
pub use crate::export::descriptor::MockupDescriptor;
pub use crate::export::serializer::{
    SAVED_LOCALLY_NOTICE, SAVED_NOTICE, SaveOutcome, SaveState, SaveTicket, UploadedSave,
};
pub use crate::export::upload::{
    DEFAULT_UPLOAD_ENDPOINT, ImageUploader, ImgbbUploader, OfflineUploader, UploadedImage,
};
pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{MockupError, MockupResult};
pub use crate::render::compositor::{Compositor, RenderMode, Scene};
pub use crate::render::frame::FrameRGBA;
pub use crate::store::order::{
    BULK_DISCOUNT_TIERS, BulkDiscountTier, DELIVERY_BUSINESS_DAYS, ORDERS_COLLECTION,
    OrderDraft, OrderHistoryEntry, OrderRecord, OrderStatus, PlacedOrder, PriceQuote,
    bulk_discount, estimate_delivery, format_delivery_date, generate_order_id, submit_order,
};
pub use crate::store::record::{
    InMemoryRecordStore, Record, RecordFilter, RecordStore, Subscription,
};
