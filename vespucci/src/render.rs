//! Offscreen presentation of map frames.
//!
//! Creates a wgpu device without a window surface, hands it to the map
//! engine's renderer, and reads rendered frames back as RGBA pixels. All
//! actual drawing is done by [`galileo::render::WgpuRenderer`].

use galileo::galileo_types::cartesian::Size;
use galileo::render::WgpuRenderer;
use galileo::Map;
use wgpu::{
    Device, Extent3d, Queue, Texture, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureView,
};

/// Errors from the offscreen presenter.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// No suitable wgpu adapter is available.
    #[error("failed to create wgpu adapter")]
    AdapterCreationFailed,
    /// The wgpu device could not be created.
    #[error("failed to create wgpu device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),
    /// The surface has a zero dimension.
    #[error("invalid surface size: {0}x{1}")]
    InvalidSize(u32, u32),
    /// A frame was requested before a presenter was attached.
    #[error("presenter is not attached")]
    NotAttached,
    /// Reading pixels back from the GPU failed.
    #[error("pixel readback failed: {0}")]
    Readback(String),
}

/// Renders map frames to an offscreen texture.
pub struct OffscreenPresenter {
    device: Device,
    queue: Queue,
    renderer: WgpuRenderer,
    target: Texture,
    target_view: TextureView,
    size: Size<u32>,
}

impl OffscreenPresenter {
    /// Creates an offscreen presenter with the given pixel size.
    ///
    /// Acquires a wgpu adapter without a compatible window surface, creates a
    /// render target texture and initializes the engine renderer against it.
    pub async fn new(size: Size<u32>) -> Result<Self, RendererError> {
        if size.width() == 0 || size.height() == 0 {
            return Err(RendererError::InvalidSize(size.width(), size.height()));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RendererError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Vespucci Offscreen Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let (target, target_view) = create_target(&device, size);
        let renderer = WgpuRenderer::new_with_device_and_texture(device.clone(), queue.clone(), size);

        Ok(Self {
            device,
            queue,
            renderer,
            target,
            target_view,
            size,
        })
    }

    /// The presenter's pixel size.
    pub fn size(&self) -> Size<u32> {
        self.size
    }

    pub(crate) fn render(&mut self, map: &Map) {
        self.renderer.render_to_texture_view(map, &self.target_view);
    }

    /// Copies the rendered frame into CPU memory as tightly packed RGBA rows.
    pub(crate) fn read_pixels(&self) -> Result<Vec<u8>, RendererError> {
        let width = self.size.width();
        let height = self.size.height();

        let unpadded_bytes_per_row = 4 * width;
        // wgpu requires bytes_per_row to be 256-aligned for texture copies.
        let padded_bytes_per_row = unpadded_bytes_per_row
            .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Vespucci Staging Buffer"),
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Vespucci Copy Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| RendererError::Readback(err.to_string()))?;
        receiver
            .recv()
            .map_err(|err| RendererError::Readback(err.to_string()))?
            .map_err(|err| RendererError::Readback(err.to_string()))?;

        let mapped = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in mapped.chunks(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }
        drop(mapped);
        staging_buffer.unmap();

        Ok(pixels)
    }
}

fn create_target(device: &Device, size: Size<u32>) -> (Texture, TextureView) {
    let texture_desc = TextureDescriptor {
        size: Extent3d {
            width: size.width(),
            height: size.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::COPY_SRC | TextureUsages::RENDER_ATTACHMENT,
        label: Some("Vespucci Render Target"),
        view_formats: &[],
    };

    let texture = device.create_texture(&texture_desc);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    (texture, texture_view)
}
