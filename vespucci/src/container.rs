//! Display surface registry.
//!
//! A container is the pre-existing display surface a map renders into. The
//! host registers surfaces before running the bootstrapper; looking up an
//! unregistered identifier is the bootstrapper's only synchronous failure
//! mode besides config validation.

use std::collections::HashMap;
use std::sync::Arc;

use galileo::galileo_types::cartesian::Size;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Physical size of a display surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    pub(crate) fn as_galileo(&self) -> Size<u32> {
        Size::new(self.width, self.height)
    }
}

/// A registered display surface.
#[derive(Debug, Clone)]
pub struct Container {
    id: String,
    size: SurfaceSize,
}

impl Container {
    /// The surface identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The surface size in pixels.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }
}

/// Registry of display surfaces known to the host.
#[derive(Default)]
pub struct ContainerRegistry {
    inner: Mutex<HashMap<String, Arc<Container>>>,
}

impl ContainerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface, replacing any previous surface with the same id.
    pub fn register(&self, id: impl Into<String>, size: SurfaceSize) -> Arc<Container> {
        let id = id.into();
        let container = Arc::new(Container {
            id: id.clone(),
            size,
        });
        self.inner.lock().insert(id, container.clone());
        container
    }

    /// Looks up a surface by id.
    pub fn get(&self, id: &str) -> Option<Arc<Container>> {
        self.inner.lock().get(id).cloned()
    }

    /// Whether a surface with the given id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let registry = ContainerRegistry::new();
        registry.register(
            "main",
            SurfaceSize {
                width: 640,
                height: 480,
            },
        );

        assert!(registry.contains("main"));
        let container = registry.get("main").expect("registered");
        assert_eq!(container.id(), "main");
        assert_eq!(container.size().width, 640);
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn re_registering_replaces() {
        let registry = ContainerRegistry::new();
        registry.register(
            "main",
            SurfaceSize {
                width: 640,
                height: 480,
            },
        );
        registry.register(
            "main",
            SurfaceSize {
                width: 800,
                height: 600,
            },
        );

        let container = registry.get("main").expect("registered");
        assert_eq!(container.size().width, 800);
    }
}
