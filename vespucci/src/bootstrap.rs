//! The map bootstrapper.
//!
//! Given a validated [`MapInitConfig`], constructs one live map instance
//! bound to a registered display surface with the configured base style,
//! center and zoom, and registers one navigation control on it. Failures are
//! propagated as-is; a failed bootstrap leaves no session behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use galileo::layer::raster_tile_layer::RasterTileLayer;
use galileo::{Map, MapBuilder};
use log::info;
use parking_lot::Mutex;

use crate::config::MapInitConfig;
use crate::container::{ContainerRegistry, SurfaceSize};
use crate::control::NavigationControl;
use crate::error::{Error, Result};
use crate::session::{resolution_for_zoom, MapSession, SessionId};
use crate::style;

/// Constructs map instances and tracks the resulting sessions.
pub struct Bootstrapper {
    containers: Arc<ContainerRegistry>,
    sessions: Mutex<HashMap<SessionId, Arc<MapSession>>>,
    session_counter: AtomicU32,
}

impl Bootstrapper {
    /// Creates a bootstrapper over the given surface registry.
    pub fn new(containers: Arc<ContainerRegistry>) -> Self {
        Self {
            containers,
            sessions: Mutex::new(HashMap::new()),
            session_counter: AtomicU32::new(0),
        }
    }

    /// Constructs one map instance from the given configuration.
    ///
    /// Resolves the display surface, builds the base tile layer with the
    /// credential applied, constructs the map at the configured center and
    /// zoom, and attaches one navigation control in the default slot. The
    /// returned session is independent of any other session produced by this
    /// or any other bootstrapper.
    pub fn bootstrap(&self, config: MapInitConfig) -> Result<Arc<MapSession>> {
        let container = self
            .containers
            .get(&config.container_ref)
            .ok_or_else(|| Error::MissingContainer(config.container_ref.clone()))?;

        let layer = style::build_layer(&config.base_style, &config.credential)?;
        let map = build_map(&config, container.size(), layer);

        let session_id = self.next_session_id();
        let session = MapSession::new(session_id, &container, map);
        session.attach_control(NavigationControl::default());

        self.sessions.lock().insert(session_id, session.clone());
        info!(
            "Session {}: map bound to '{}' at ({:.4}, {:.4}), zoom {}",
            session_id, config.container_ref, config.center.lon, config.center.lat, config.zoom
        );

        Ok(session)
    }

    /// Looks up a live session by id.
    pub fn session(&self, id: SessionId) -> Option<Arc<MapSession>> {
        self.sessions.lock().get(&id).cloned()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Destroys a session, returning whether it existed.
    pub fn destroy_session(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().remove(&id).is_some();
        if removed {
            info!("Session {id} destroyed");
        }
        removed
    }

    /// Destroys all live sessions.
    pub fn destroy_all_sessions(&self) {
        let mut sessions = self.sessions.lock();
        let count = sessions.len();
        sessions.clear();
        info!("Destroyed {count} sessions");
    }

    fn next_session_id(&self) -> SessionId {
        self.session_counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn build_map(config: &MapInitConfig, surface: SurfaceSize, layer: RasterTileLayer) -> Map {
    let mut map = MapBuilder::default()
        .with_latlon(config.center.lat, config.center.lon)
        .with_z_level(config.zoom.floor() as u32)
        .with_layer(layer)
        .build();

    // with_z_level only takes whole levels; apply the fractional part through
    // the view resolution.
    let view = map.view().with_resolution(resolution_for_zoom(config.zoom));
    map.set_view(view);
    map.set_size(surface.as_galileo().cast());

    map
}
