use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::error::{RenderError, RenderResult};

use super::error::scoped;
use super::surface;
use super::viewport::{DepthTarget, ResizeOutcome, TargetExtents, Viewport};
use super::{Frame, GpuInit, SurfaceErrorAction};

/// Owns wgpu core objects, the surface configuration and the depth target.
///
/// This type is the low-level rendering context:
/// - creates and stores Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - keeps the depth target and viewport matched to the surface size
/// - acquires and presents frames
pub struct DeviceContext<'w> {
    /// Instance the surface and adapter were created from.
    _instance: wgpu::Instance,

    /// Surface bound to the window.
    surface: wgpu::Surface<'w>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    depth: DepthTarget,
    extents: TargetExtents,
}

impl<'w> DeviceContext<'w> {
    /// Creates the device, the surface and both render targets.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        width: u32,
        height: u32,
        init: GpuInit,
    ) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::DeviceCreation("window has zero size".into()));
        }

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            mut required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::DeviceCreation(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::DeviceCreation(format!("no suitable adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        if adapter
            .features()
            .contains(wgpu::Features::TEXTURE_COMPRESSION_BC)
        {
            required_features |= wgpu::Features::TEXTURE_COMPRESSION_BC;
        } else {
            log::warn!("adapter lacks BC texture compression; compressed assets will fail to load");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("skybox device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::DeviceCreation(format!("device request failed: {e}")))?;

        // Recorded work runs under error scopes; this only sees stragglers.
        device.on_uncaptured_error(Arc::new(|e: wgpu::Error| {
            log::error!("uncaptured GPU error: {e}");
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .ok_or_else(|| RenderError::DeviceCreation("no supported surface formats".into()))?;
        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        let depth = scoped(
            &device,
            || {
                surface.configure(&device, &config);
                Ok(DepthTarget::new(&device, width, height))
            },
            |e| RenderError::DeviceCreation(format!("surface configuration rejected: {e}")),
        )?;
        log::debug!("surface configured: {width}x{height} {format:?} {present_mode:?}");

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            depth,
            extents: TargetExtents::new(width, height),
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the last requested size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        let (width, height) = self.extents.requested;
        PhysicalSize::new(width, height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    pub fn viewport(&self) -> Viewport {
        self.extents.viewport
    }

    /// Sizes the render targets were last built at.
    pub fn extents(&self) -> TargetExtents {
        self.extents
    }

    /// True while the window is minimised.
    pub fn is_suspended(&self) -> bool {
        self.extents.is_suspended()
    }

    /// Rebuilds the surface back buffers, the depth target and the viewport.
    ///
    /// A zero dimension only records the size; drawing stays suspended until a
    /// non-zero size arrives.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let max = self.device.limits().max_texture_dimension_2d;

        match self.extents.resize(width, height, max)? {
            ResizeOutcome::Suspend => {
                log::debug!("resize to {width}x{height}: drawing suspended");
            }
            ResizeOutcome::Apply { width, height } => {
                self.config.width = width;
                self.config.height = height;
                let (surface, device, config) = (&self.surface, &self.device, &self.config);
                self.depth = scoped(
                    device,
                    || {
                        surface.configure(device, config);
                        Ok(DepthTarget::new(device, width, height))
                    },
                    |e| RenderError::Resize {
                        width,
                        height,
                        reason: e.to_string(),
                    },
                )?;
                log::info!("resized to {width}x{height}");
            }
        }
        Ok(())
    }

    /// Acquires the next surface texture and creates an encoder.
    ///
    /// `Ok(None)` means this frame is skipped: the window is minimised, the
    /// surface had to be reconfigured, or acquisition timed out.
    pub fn begin_frame(&self) -> RenderResult<Option<Frame>> {
        if self.is_suspended() {
            return Ok(None);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                return match surface::handle_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    &err,
                ) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::warn!("skipping frame: {err}");
                        Ok(None)
                    }
                    SurfaceErrorAction::Fatal => {
                        Err(RenderError::Frame(format!("surface acquisition failed: {err}")))
                    }
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        Ok(Some(Frame {
            surface_texture,
            view,
            encoder,
        }))
    }

    /// Submits the recorded commands and flips the surface.
    ///
    /// Under FIFO the flip waits for the display, which paces the loop.
    pub fn present(&self, frame: Frame) {
        let Frame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }
}
