//! Live map sessions.
//!
//! A [`MapSession`] is the opaque handle returned by the bootstrapper: the
//! live map instance bound to its display surface, the controls registered on
//! it, and the redraw signaling that connects the map engine back to the
//! host's presentation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use galileo::galileo_types::geo::impls::GeoPoint2d;
use galileo::galileo_types::geo::{GeoPoint, NewGeoPoint};
use galileo::{Map, Messenger};
use log::debug;
use parking_lot::Mutex;

use crate::config::{check_range, GeoCenter, LAT_RANGE, LON_RANGE, ZOOM_RANGE};
use crate::container::{Container, SurfaceSize};
use crate::control::NavigationControl;
use crate::error::Result;
use crate::render::{OffscreenPresenter, RendererError};

/// Identifier of a live map session.
pub type SessionId = u32;

/// Lowest allowed zoom level.
pub(crate) const MIN_ZOOM: f64 = ZOOM_RANGE.0;
/// Highest allowed zoom level.
pub(crate) const MAX_ZOOM: f64 = ZOOM_RANGE.1;

/// Resolution of zoom level 0 in Web Mercator meters per pixel.
const TOP_RESOLUTION: f64 = 156543.03392800014;

pub(crate) fn resolution_for_zoom(zoom: f64) -> f64 {
    TOP_RESOLUTION / 2f64.powf(zoom)
}

pub(crate) fn zoom_for_resolution(resolution: f64) -> f64 {
    (TOP_RESOLUTION / resolution).log2()
}

/// Viewport state of a live map: center, zoom and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    /// View center.
    pub center: GeoCenter,
    /// Zoom level.
    pub zoom: f64,
    /// Rotation in radians. Always 0: the view is north-up.
    pub rotation: f64,
}

/// Redraw request flag shared with the map engine.
#[derive(Clone)]
struct RedrawSignal(Arc<AtomicBool>);

impl Messenger for RedrawSignal {
    fn request_redraw(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A live map instance bound to a display surface.
pub struct MapSession {
    id: SessionId,
    container_id: String,
    surface: SurfaceSize,
    map: Mutex<Map>,
    controls: Mutex<Vec<NavigationControl>>,
    needs_redraw: Arc<AtomicBool>,
    presenter: Mutex<Option<OffscreenPresenter>>,
}

impl MapSession {
    pub(crate) fn new(id: SessionId, container: &Container, mut map: Map) -> Arc<Self> {
        let needs_redraw = Arc::new(AtomicBool::new(true));
        let signal = RedrawSignal(needs_redraw.clone());
        for layer in map.layers_mut().iter_mut() {
            layer.set_messenger(Box::new(signal.clone()));
        }
        map.set_messenger(Some(signal));

        Arc::new(Self {
            id,
            container_id: container.id().to_string(),
            surface: container.size(),
            map: Mutex::new(map),
            controls: Mutex::new(Vec::new()),
            needs_redraw,
            presenter: Mutex::new(None),
        })
    }

    /// The session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Identifier of the display surface this map is bound to.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Size of the bound display surface.
    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    /// Controls registered on this map instance.
    pub fn controls(&self) -> Vec<NavigationControl> {
        self.controls.lock().clone()
    }

    pub(crate) fn attach_control(&self, control: NavigationControl) {
        debug!(
            "Session {}: attaching navigation control in {:?}",
            self.id,
            control.slot()
        );
        self.controls.lock().push(control);
    }

    /// The current viewport of the live map.
    pub fn viewport(&self) -> MapViewport {
        let map = self.map.lock();
        let view = map.view();
        let position = view
            .position()
            .unwrap_or_else(|| GeoPoint2d::latlon(0.0, 0.0));

        MapViewport {
            center: GeoCenter {
                lon: position.lon(),
                lat: position.lat(),
            },
            zoom: zoom_for_resolution(view.resolution()),
            rotation: 0.0,
        }
    }

    /// Moves the view to the given center and zoom.
    pub fn set_viewport(&self, viewport: &MapViewport) -> Result<()> {
        check_range("center.lon", viewport.center.lon, LON_RANGE)?;
        check_range("center.lat", viewport.center.lat, LAT_RANGE)?;
        check_range("zoom", viewport.zoom, ZOOM_RANGE)?;

        let mut map = self.map.lock();
        let center = GeoPoint2d::latlon(viewport.center.lat, viewport.center.lon);
        let new_view = map
            .view()
            .with_position(&center)
            .with_resolution(resolution_for_zoom(viewport.zoom));
        map.set_view(new_view);
        map.redraw();

        Ok(())
    }

    /// Zooms in by one step of the navigation control.
    pub fn zoom_in(&self) {
        if let Some(control) = self.first_control() {
            control.zoom_in(&mut self.map.lock());
        }
    }

    /// Zooms out by one step of the navigation control.
    pub fn zoom_out(&self) {
        if let Some(control) = self.first_control() {
            control.zoom_out(&mut self.map.lock());
        }
    }

    /// Resets the compass to north-up.
    pub fn reset_compass(&self) {
        if let Some(control) = self.first_control() {
            control.reset_compass(&mut self.map.lock());
        }
    }

    /// Whether the engine has requested a redraw since the last frame.
    pub fn take_redraw_request(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Relaxed)
    }

    /// Creates the offscreen presenter for this session's surface.
    pub async fn attach_presenter(&self) -> Result<()> {
        let presenter = OffscreenPresenter::new(self.surface.as_galileo()).await?;
        *self.presenter.lock() = Some(presenter);
        debug!("Session {}: presenter attached", self.id);
        Ok(())
    }

    /// Renders one frame and returns the RGBA pixels.
    ///
    /// Requires [`attach_presenter`](Self::attach_presenter) to have run.
    pub fn render_frame(&self) -> Result<Vec<u8>> {
        let mut presenter_guard = self.presenter.lock();
        let presenter = presenter_guard.as_mut().ok_or(RendererError::NotAttached)?;

        {
            let mut map = self.map.lock();
            map.animate();
            map.load_layers();
            presenter.render(&map);
        }

        let pixels = presenter.read_pixels()?;
        self.needs_redraw.store(false, Ordering::Relaxed);
        Ok(pixels)
    }

    fn first_control(&self) -> Option<NavigationControl> {
        self.controls.lock().first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn zoom_resolution_roundtrip() {
        for zoom in [0.0, 1.0, 6.5, 22.0] {
            assert_relative_eq!(
                zoom_for_resolution(resolution_for_zoom(zoom)),
                zoom,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn zoom_zero_is_top_resolution() {
        assert_relative_eq!(resolution_for_zoom(0.0), TOP_RESOLUTION);
    }

    #[test]
    fn each_zoom_level_halves_resolution() {
        assert_relative_eq!(
            resolution_for_zoom(7.0) * 2.0,
            resolution_for_zoom(6.0),
            epsilon = 1e-9
        );
    }
}
