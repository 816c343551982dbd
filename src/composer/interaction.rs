//! Pointer interaction state machine for placing the design.
//!
//! The controller owns only the gesture state. Geometry is passed in per event so the
//! session stays the single owner of everything it mutates.

use crate::composer::geometry::GeometryState;
use crate::foundation::core::{Point, Vec2};

/// Unified pointer input. Mouse and touch both map onto these.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
    TouchEnd,
}

/// Active gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    /// `offset` is `pointer - center` captured on press.
    Dragging { offset: Vec2 },
    /// `last` is the previous pointer position; resizing is incremental.
    Resizing { last: Point },
}

/// Hit-test and clamp parameters, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionLimits {
    /// Side of the square resize hit region around the bottom-right corner.
    pub resize_handle_hit: f64,
    /// Neither side of the design may shrink below this.
    pub min_design_size: f64,
}

impl Default for InteractionLimits {
    fn default() -> Self {
        Self {
            resize_handle_hit: 10.0,
            min_design_size: 10.0,
        }
    }
}

/// What an event did, for the host to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    RenderNeeded,
}

#[derive(Clone, Debug, Default)]
pub struct PointerController {
    state: InteractionState,
    limits: InteractionLimits,
}

impl PointerController {
    pub fn new(limits: InteractionLimits) -> Self {
        Self {
            state: InteractionState::Idle,
            limits,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn limits(&self) -> InteractionLimits {
        self.limits
    }

    /// Drop any gesture in progress.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Feed one event. `geometry` is `None` while no design is loaded, in which case
    /// presses are ignored.
    pub fn handle(&mut self, event: PointerEvent, geometry: Option<&mut GeometryState>) -> Action {
        match event {
            PointerEvent::Down { x, y } => match geometry {
                Some(g) => self.on_pointer_down(Point::new(x, y), g),
                None => Action::None,
            },
            PointerEvent::Move { x, y } => match geometry {
                Some(g) => self.on_pointer_move(Point::new(x, y), g),
                None => Action::None,
            },
            PointerEvent::Up | PointerEvent::Leave | PointerEvent::TouchEnd => {
                self.on_pointer_up()
            }
        }
    }

    fn on_pointer_down(&mut self, pt: Point, geometry: &GeometryState) -> Action {
        // Resize corner wins over the body.
        if geometry.hits_resize_handle(pt, self.limits.resize_handle_hit) {
            self.state = InteractionState::Resizing { last: pt };
        } else if geometry.contains(pt) {
            self.state = InteractionState::Dragging {
                offset: pt - geometry.center(),
            };
        } else {
            return Action::None;
        }
        tracing::debug!(state = ?self.state, "gesture started");
        Action::None
    }

    fn on_pointer_move(&mut self, pt: Point, geometry: &mut GeometryState) -> Action {
        match self.state {
            InteractionState::Idle => Action::None,
            InteractionState::Dragging { offset } => {
                geometry.move_center_to(pt - offset);
                Action::RenderNeeded
            }
            InteractionState::Resizing { last } => {
                let dx = pt.x - last.x;
                self.state = InteractionState::Resizing { last: pt };
                let scale = 1.0 + dx / geometry.width;
                if geometry.scale_uniform(scale, self.limits.min_design_size) {
                    Action::RenderNeeded
                } else {
                    Action::None
                }
            }
        }
    }

    fn on_pointer_up(&mut self) -> Action {
        if self.state != InteractionState::Idle {
            tracing::debug!(state = ?self.state, "gesture ended");
        }
        self.state = InteractionState::Idle;
        Action::None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composer/interaction.rs"]
mod tests;
