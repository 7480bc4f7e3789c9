//! Vespucci bootstraps interactive [Galileo](https://docs.rs/galileo) map
//! instances from typed configuration.
//!
//! On startup the host registers its display surfaces, loads an
//! [`AppConfig`] (TOML file plus a credential from the environment), and asks
//! the [`Bootstrapper`] for a map: one live instance bound to the named
//! surface with the configured base style, center and zoom, with a single
//! navigation control registered on it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vespucci::{AppConfig, Bootstrapper, ContainerRegistry, SurfaceSize};
//!
//! # fn run() -> vespucci::Result<()> {
//! let config = AppConfig::from_file("vespucci.toml")?;
//!
//! let containers = Arc::new(ContainerRegistry::new());
//! containers.register(
//!     &config.map.container,
//!     SurfaceSize { width: config.surface.width, height: config.surface.height },
//! );
//!
//! let bootstrapper = Bootstrapper::new(containers);
//! let session = bootstrapper.bootstrap(config.resolve()?)?;
//! println!("map centered at {:?}", session.viewport().center);
//! # Ok(())
//! # }
//! ```
//!
//! Tile fetching, rendering, projection math and gesture handling are all
//! owned by the Galileo engine; this crate only configures it and hands back
//! session handles.

pub mod bootstrap;
pub mod config;
pub mod container;
pub mod control;
pub mod error;
pub mod logging;
pub mod render;
pub mod session;
pub mod style;

pub use bootstrap::Bootstrapper;
pub use config::{AppConfig, Credential, GeoCenter, MapInitConfig};
pub use container::{Container, ContainerRegistry, SurfaceSize};
pub use control::{ControlSlot, NavigationControl};
pub use error::{Error, Result};
pub use render::OffscreenPresenter;
pub use session::{MapSession, MapViewport, SessionId};
pub use style::{BaseStyle, TileAttribution};
