//! The navigation control.
//!
//! A widget overlay offering zoom in/out and compass reset, registered onto a
//! map instance by the bootstrapper. Zooming scales the view resolution the
//! same way pinch gestures do; the view itself is always north-up.

use galileo::Map;

use crate::session::{resolution_for_zoom, zoom_for_resolution, MAX_ZOOM, MIN_ZOOM};

/// Placement slot for a control overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlSlot {
    /// Top left corner.
    TopLeft,
    /// Top right corner. The default slot.
    #[default]
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    BottomRight,
}

/// Navigation control offering zoom and compass-reset interactions.
#[derive(Debug, Clone)]
pub struct NavigationControl {
    slot: ControlSlot,
    zoom_step: f64,
}

impl Default for NavigationControl {
    fn default() -> Self {
        Self {
            slot: ControlSlot::default(),
            zoom_step: 1.0,
        }
    }
}

impl NavigationControl {
    /// Returns the control placed in the given slot.
    pub fn with_slot(mut self, slot: ControlSlot) -> Self {
        self.slot = slot;
        self
    }

    /// The slot this control occupies.
    pub fn slot(&self) -> ControlSlot {
        self.slot
    }

    /// Zooms the view in by one step.
    pub(crate) fn zoom_in(&self, map: &mut Map) {
        self.step_zoom(map, self.zoom_step);
    }

    /// Zooms the view out by one step.
    pub(crate) fn zoom_out(&self, map: &mut Map) {
        self.step_zoom(map, -self.zoom_step);
    }

    /// Resets the view to north-up.
    ///
    /// The view never rotates, so this only requests a redraw.
    pub(crate) fn reset_compass(&self, map: &mut Map) {
        map.redraw();
    }

    fn step_zoom(&self, map: &mut Map, delta: f64) {
        let current = zoom_for_resolution(map.view().resolution());
        let target = (current + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let new_view = map.view().with_resolution(resolution_for_zoom(target));
        map.set_view(new_view);
        map.redraw();
    }
}
