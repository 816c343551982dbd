use crate::assets::decode::decode_design;
use crate::assets::store::DesignAsset;
use crate::composer::garment::{GarmentColor, GarmentState, ViewSide};
use crate::composer::geometry::GeometryState;
use crate::composer::interaction::{Action, InteractionState, PointerController, PointerEvent};
use crate::composer::schedule::FrameScheduler;
use crate::config::ComposerConfig;
use crate::export::serializer::{SaveOutcome, SaveState, SaveTicket, UploadedSave};
use crate::export::upload::ImageUploader;
use crate::foundation::error::{MockupError, MockupResult};
use crate::render::compositor::{Compositor, RenderMode, Scene};
use crate::render::frame::FrameRGBA;
use crate::store::order::OrderDraft;

/// One customer's mockup editor.
///
/// Owns every piece of mutable composer state: the loaded design, its placement, the
/// garment appearance, the active gesture and the save guard. All mutation goes through
/// `&mut self`.
#[derive(Debug)]
pub struct ComposerSession {
    config: ComposerConfig,
    compositor: Compositor,
    garment: GarmentState,
    geometry: GeometryState,
    design: Option<DesignAsset>,
    controller: PointerController,
    frames: FrameScheduler,
    save_state: SaveState,
    generation: u64,
    editor_visible: bool,
}

impl ComposerSession {
    /// Validate `config` and load the garment art it names.
    ///
    /// Missing or unreadable garment art is not an error: the session still accepts
    /// designs and gestures, it just renders nothing until art is installed.
    pub fn new(config: ComposerConfig) -> MockupResult<Self> {
        config.validate()?;
        let compositor = match &config.garment_base {
            Some(front) => {
                Compositor::from_files(config.canvas, front, config.garment_base_back.as_deref())
            }
            None => {
                tracing::warn!("no garment base configured");
                Compositor::new(config.canvas)
            }
        };
        Self::with_compositor(config, compositor)
    }

    pub fn with_compositor(config: ComposerConfig, compositor: Compositor) -> MockupResult<Self> {
        config.validate()?;
        if compositor.canvas() != config.canvas {
            return Err(MockupError::validation(
                "compositor canvas does not match the configured canvas",
            ));
        }
        let geometry = initial_geometry(&config, None);
        let controller = PointerController::new(config.interaction_limits());
        Ok(Self {
            config,
            compositor,
            garment: GarmentState::default(),
            geometry,
            design: None,
            controller,
            frames: FrameScheduler::new(),
            save_state: SaveState::Idle,
            generation: 0,
            editor_visible: false,
        })
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn garment(&self) -> GarmentState {
        self.garment
    }

    pub fn geometry(&self) -> GeometryState {
        self.geometry
    }

    pub fn design(&self) -> Option<&DesignAsset> {
        self.design.as_ref()
    }

    pub fn has_design(&self) -> bool {
        self.design.is_some()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    /// Bumped on every reset; saves begun under an older generation are discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the editor region should be shown. Cleared once a save completes.
    pub fn editor_visible(&self) -> bool {
        self.editor_visible
    }

    /// Validate and decode a design upload, replacing any previous design.
    ///
    /// On error nothing changes.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn load_design(&mut self, bytes: &[u8], declared_mime: Option<&str>) -> MockupResult<()> {
        let asset = decode_design(bytes, declared_mime, self.config.max_design_bytes)?;
        self.geometry = initial_geometry(&self.config, Some(&asset));
        self.controller.cancel();
        self.design = Some(asset);
        self.editor_visible = true;
        self.frames.request();
        tracing::info!(
            width = self.geometry.width,
            height = self.geometry.height,
            "design loaded"
        );
        Ok(())
    }

    /// Feed one pointer event to the interaction controller.
    pub fn handle_event(&mut self, event: PointerEvent) -> Action {
        let geometry = self.design.is_some().then_some(&mut self.geometry);
        let action = self.controller.handle(event, geometry);
        if action == Action::RenderNeeded {
            self.frames.request();
        }
        action
    }

    /// Feed events in order. Returns `true` if any of them requested a frame.
    pub fn dispatch(&mut self, events: impl IntoIterator<Item = PointerEvent>) -> bool {
        events
            .into_iter()
            .fold(false, |acc, e| (self.handle_event(e) == Action::RenderNeeded) || acc)
    }

    pub fn set_garment_color(&mut self, color: GarmentColor) {
        if self.garment.color != color {
            self.garment.color = color;
            self.frames.request();
        }
    }

    pub fn set_view_side(&mut self, side: ViewSide) {
        if self.garment.view_side != side {
            self.garment.view_side = side;
            self.frames.request();
        }
    }

    pub fn toggle_view_side(&mut self) -> ViewSide {
        self.set_view_side(self.garment.view_side.flipped());
        self.garment.view_side
    }

    /// Slider sizing: scale uniformly so the longer side becomes `size`.
    ///
    /// The center stays put and the shorter side never drops below the configured
    /// minimum. Returns `false` when nothing changed (no design, bad input, same size).
    pub fn set_design_size(&mut self, size: f64) -> bool {
        if self.design.is_none() || !size.is_finite() {
            return false;
        }
        let target = size.max(self.config.min_design_size);
        let longer = self.geometry.width.max(self.geometry.height);
        let changed = self
            .geometry
            .scale_uniform(target / longer, self.config.min_design_size);
        if changed {
            self.frames.request();
        }
        changed
    }

    /// Put the design back at its initial fitted placement.
    pub fn reset_placement(&mut self) -> bool {
        let Some(design) = &self.design else {
            return false;
        };
        self.geometry = initial_geometry(&self.config, Some(design));
        self.controller.cancel();
        self.frames.request();
        true
    }

    /// Start over: drop the design, restore defaults, abandon any in-flight save.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.design = None;
        self.garment = GarmentState::default();
        self.geometry = initial_geometry(&self.config, None);
        self.controller.cancel();
        self.save_state = SaveState::Idle;
        self.editor_visible = false;
        self.frames.request();
        tracing::debug!(generation = self.generation, "composer reset");
    }

    pub fn frame_pending(&self) -> bool {
        self.frames.is_pending()
    }

    /// Drain the pending frame request. The host calls this from its frame callback.
    pub fn take_frame_request(&mut self) -> bool {
        self.frames.take_frame_request()
    }

    /// Render the current state regardless of pending requests.
    pub fn render(&self, mode: RenderMode) -> Option<FrameRGBA> {
        let scene = Scene {
            garment: &self.garment,
            geometry: &self.geometry,
            design: self.design.as_ref().map(|d| &d.image),
        };
        self.compositor.render(&scene, mode)
    }

    /// Render an interactive frame only if one was requested since the last call.
    pub fn render_frame(&mut self) -> Option<FrameRGBA> {
        if !self.take_frame_request() {
            return None;
        }
        self.render(RenderMode::Interactive)
    }

    /// Rasterize the export image and snapshot the state it shows.
    ///
    /// Marks the session as uploading; a second call before [`Self::finish_save`] fails
    /// with [`MockupError::SaveInFlight`].
    #[tracing::instrument(skip(self), fields(generation = self.generation))]
    pub fn begin_save(&mut self) -> MockupResult<SaveTicket> {
        if self.design.is_none() {
            return Err(MockupError::NoDesignLoaded);
        }
        if matches!(self.save_state, SaveState::Uploading { .. }) {
            return Err(MockupError::SaveInFlight);
        }

        let frame = self
            .render(RenderMode::Export)
            .ok_or_else(|| MockupError::asset_load("garment base image is not available"))?;
        let png = frame.encode_png()?;

        self.save_state = SaveState::Uploading {
            generation: self.generation,
        };
        Ok(SaveTicket {
            generation: self.generation,
            png,
            garment: self.garment,
            geometry: self.geometry,
        })
    }

    /// Apply a finished upload: write the descriptor into `draft` and hide the editor.
    ///
    /// Results from before the latest reset are dropped without touching anything.
    pub fn finish_save(&mut self, uploaded: UploadedSave, draft: &mut OrderDraft) -> SaveOutcome {
        if uploaded.generation() != self.generation {
            tracing::warn!(
                stale = uploaded.generation(),
                current = self.generation,
                "discarding save from before reset"
            );
            return SaveOutcome::Discarded;
        }

        let outcome = uploaded.into_outcome();
        self.save_state = match outcome {
            SaveOutcome::Uploaded(_) => SaveState::Done,
            SaveOutcome::SavedLocally(_) => SaveState::FallbackDone,
            SaveOutcome::Discarded => self.save_state,
        };
        if let Some(descriptor) = outcome.descriptor() {
            draft.attach_mockup(descriptor.clone());
            self.editor_visible = false;
            tracing::info!(
                inline = descriptor.is_inline(),
                "mockup saved to order draft"
            );
        }
        outcome
    }

    /// Release the in-flight guard for a save whose ticket or result was lost.
    ///
    /// Returns `true` if a save was in flight. A result that arrives afterwards is discarded.
    pub fn abandon_save(&mut self) -> bool {
        if !matches!(self.save_state, SaveState::Uploading { .. }) {
            return false;
        }
        self.generation += 1;
        self.save_state = SaveState::Idle;
        tracing::warn!(generation = self.generation, "in-flight save abandoned");
        true
    }

    /// `begin_save`, upload on the calling thread, then `finish_save`.
    pub fn save(
        &mut self,
        uploader: &dyn ImageUploader,
        draft: &mut OrderDraft,
    ) -> MockupResult<SaveOutcome> {
        let ticket = self.begin_save()?;
        let uploaded = ticket.upload(uploader);
        Ok(self.finish_save(uploaded, draft))
    }
}

fn initial_geometry(config: &ComposerConfig, design: Option<&DesignAsset>) -> GeometryState {
    let (w, h) = design.map_or((1, 1), |d| (d.image.width, d.image.height));
    GeometryState::fitted(config.design_origin, w, h, config.initial_design_size)
}

#[cfg(test)]
#[path = "../../tests/unit/composer/session.rs"]
mod tests;
