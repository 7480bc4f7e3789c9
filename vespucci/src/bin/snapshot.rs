//! Renders one frame of the configured map to a PNG file.
//!
//! Reads `vespucci.toml` from the working directory (override the path with
//! `VESPUCCI_CONFIG`), falling back to the built-in development defaults.
//! The output path is taken from `VESPUCCI_SNAPSHOT`, defaulting to
//! `map.png`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::info;
use vespucci::{AppConfig, Bootstrapper, ContainerRegistry, SurfaceSize};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("VESPUCCI_CONFIG").unwrap_or_else(|_| "vespucci.toml".to_string());
    let config = if Path::new(&config_path).exists() {
        AppConfig::from_file(&config_path)
            .with_context(|| format!("failed to load {config_path}"))?
    } else {
        AppConfig::dev_defaults()
    };

    vespucci::logging::init(&config.logging)?;

    let containers = Arc::new(ContainerRegistry::new());
    containers.register(
        &config.map.container,
        SurfaceSize {
            width: config.surface.width,
            height: config.surface.height,
        },
    );

    let bootstrapper = Bootstrapper::new(containers);
    let session = bootstrapper.bootstrap(config.resolve()?)?;
    session.attach_presenter().await?;

    // First frame kicks off the tile downloads; give them a moment to land
    // before rendering the frame that gets written out.
    session.render_frame()?;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let pixels = session.render_frame()?;

    let size = session.surface_size();
    let image = image::RgbaImage::from_raw(size.width, size.height, pixels)
        .context("rendered frame has unexpected size")?;

    let output = std::env::var("VESPUCCI_SNAPSHOT").unwrap_or_else(|_| "map.png".to_string());
    image
        .save(&output)
        .with_context(|| format!("failed to write {output}"))?;
    info!("Snapshot written to {output}");

    Ok(())
}
