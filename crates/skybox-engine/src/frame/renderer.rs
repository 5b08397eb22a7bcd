use crate::device::{settle, DeviceContext, ErrorScopes, Frame, Viewport};
use crate::error::{RenderError, RenderResult};
use crate::input::{orbit_step, Key, KeyState};
use crate::pipeline::PipelineStates;
use crate::resources::{
    self, ResourceStore, SamplerConfig, ShaderPairDesc, TextureKind, UpdateFrequency,
};
use crate::scene::SceneState;
use crate::time::FrameTime;

use super::config::RendererConfig;
use super::plan::{ClearValues, Draw, FramePlan, Layer, PassDescriptor, StandardDraws};
use super::state::{FrameCycle, FrameState};
use super::stats::FrameStats;
use super::uploads::{MatrixUploads, MATRIX_BYTES};

/// Result of one [`Renderer::frame`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// No surface texture this time (minimised, reconfigured, timed out).
    Skipped,
}

/// Frame orchestrator: owns the device, every resource and the scene.
///
/// Field order is teardown order: pipelines, then the store, then the device.
pub struct Renderer<'w> {
    config: RendererConfig,
    cycle: FrameCycle,
    scene: SceneState,
    plan: FramePlan,
    uploads: MatrixUploads,
    stats: FrameStats,

    pipelines: PipelineStates,
    store: ResourceStore,
    device: DeviceContext<'w>,
}

impl<'w> Renderer<'w> {
    /// Creates the device and every resource, then moves to `Ready`.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> RenderResult<Self> {
        let device = DeviceContext::new(target, width, height, config.gpu.clone()).await?;
        let mut store = ResourceStore::new(device.device().clone(), device.queue().clone());
        let mut pipelines = PipelineStates::new(device.surface_format());
        let mut cycle = FrameCycle::new();

        let scene_cfg = &config.scene;
        let uploads = MatrixUploads::standard(config.layers, |slot| {
            store.create_constant_buffer(
                slot.label(),
                MATRIX_BYTES,
                UpdateFrequency::PerFrame,
                None,
            )
        })?;
        let mut draws = StandardDraws {
            sky: None,
            cube: None,
        };

        if config.layers.background {
            let sky = &scene_cfg.sky;
            let mesh_data = resources::sky_sphere(sky.slices, sky.stacks, sky.radius);
            let mesh = store.create_static_mesh("sky", &mesh_data)?;
            let program = store.create_shader_pair(&ShaderPairDesc::sky())?;
            let texture = store.create_texture(&config.assets.sky_texture, TextureKind::Cube)?;
            let sampler = store.create_sampler("sky sampler", SamplerConfig::CLAMP)?;
            let uniforms = uploads.buffers(Layer::Background);
            let bindings = store.create_binding_set(program, &uniforms, texture, sampler)?;

            draws.sky = Some(Draw {
                mesh,
                program,
                bindings,
                index_count: mesh_data.index_count(),
            });
        }

        if config.layers.foreground {
            let mesh_data = resources::cube(scene_cfg.cube_half_extent);
            let mesh = store.create_static_mesh("cube", &mesh_data)?;
            let program = store.create_shader_pair(&ShaderPairDesc::cube())?;
            let texture = store.create_texture(&config.assets.cube_texture, TextureKind::Flat)?;
            let sampler = store.create_sampler("cube sampler", SamplerConfig::WRAP)?;
            let uniforms = uploads.buffers(Layer::Foreground);
            let bindings = store.create_binding_set(program, &uniforms, texture, sampler)?;

            draws.cube = Some(Draw {
                mesh,
                program,
                bindings,
                index_count: mesh_data.index_count(),
            });
        }

        let plan = FramePlan::standard(
            config.layers,
            draws,
            ClearValues::new(scene_cfg.clear_color),
        );
        plan.validate(|mesh| store.mesh_info(mesh).ok().map(|info| info.index_count))?;

        for pass in plan.passes() {
            if let Some(draw) = pass.draw {
                store.check_binding_set(draw.bindings, draw.program)?;
                pipelines.prepare(device.device(), &store, draw.program, pass.depth)?;
            }
        }

        let scene = SceneState::new(width, height);
        cycle.advance(FrameState::Ready)?;
        log::info!(
            "renderer ready: {} resources, {} pipelines, {} passes",
            store.len(),
            pipelines.len(),
            plan.passes().len()
        );

        Ok(Self {
            config,
            cycle,
            scene,
            plan,
            uploads,
            stats: FrameStats::default(),
            pipelines,
            store,
            device,
        })
    }

    pub fn state(&self) -> FrameState {
        self.cycle.state()
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn device(&self) -> &DeviceContext<'w> {
        &self.device
    }

    /// Resizes the surface and depth target. The aspect ratio follows the
    /// render target, so it holds through a minimise.
    pub fn on_resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.device.resize(width, height)?;
        let (width, height) = self.device.extents().render_target;
        self.scene.set_surface_size(width, height);
        Ok(())
    }

    /// Steps the camera orbit for orbit keys on press and auto-repeat.
    pub fn on_key(&mut self, key: Key, state: KeyState) {
        if let Some(delta) = orbit_step(key, state, self.config.scene.motion.orbit_step) {
            self.scene.advance(0.0, delta);
        }
    }

    /// Runs one full frame: update, background, foreground, present.
    ///
    /// The whole frame runs under GPU error scopes; anything the device
    /// rejects ends the session with `RenderError::Frame`.
    pub fn frame(&mut self, time: &FrameTime) -> RenderResult<FrameOutcome> {
        let scopes = ErrorScopes::push(self.device.device());
        let result = self.run_frame(time);
        settle(result, scopes.pop(), |e| {
            RenderError::Frame(format!("GPU rejected the frame: {e}"))
        })
    }

    fn run_frame(&mut self, time: &FrameTime) -> RenderResult<FrameOutcome> {
        let Some(mut frame) = self.device.begin_frame()? else {
            self.stats.frames_skipped += 1;
            return Ok(FrameOutcome::Skipped);
        };

        self.cycle.advance(FrameState::Updating)?;
        self.update(time)?;

        self.cycle.advance(FrameState::DrawingBackground)?;
        self.encode_layer(&mut frame, Layer::Background)?;

        self.cycle.advance(FrameState::DrawingForeground)?;
        self.encode_layer(&mut frame, Layer::Foreground)?;

        self.cycle.advance(FrameState::Presenting)?;
        self.device.present(frame);
        self.stats.frames_presented += 1;

        self.cycle.advance(FrameState::Ready)?;
        Ok(FrameOutcome::Presented)
    }

    fn update(&mut self, time: &FrameTime) -> RenderResult<()> {
        let d_spin = self.config.scene.motion.spin.step(time.dt);
        self.scene.advance(d_spin, 0.0);

        let derived = self.scene.matrices(&self.config.scene);
        for (buffer, cols) in self.uploads.writes(&derived) {
            self.store
                .update_constant_buffer(buffer, bytemuck::bytes_of(&cols))?;
            self.stats.constant_writes += 1;
        }
        Ok(())
    }

    fn encode_layer(&self, frame: &mut Frame, layer: Layer) -> RenderResult<()> {
        for pass in self.plan.layer(layer) {
            encode_pass(
                frame,
                self.device.depth_view(),
                self.device.viewport(),
                &self.store,
                &self.pipelines,
                pass,
            )?;
        }
        Ok(())
    }

    /// Releases pipelines, then every resource newest first.
    fn terminate(&mut self) {
        if !self.cycle.terminate() {
            return;
        }
        self.pipelines.clear();
        self.store.release_all();
        let s = self.stats;
        log::info!(
            "renderer terminated: {} frames ({} presented, {} skipped), {} constant writes",
            s.frames_attempted(),
            s.frames_presented,
            s.frames_skipped,
            s.constant_writes
        );
    }
}

impl Drop for Renderer<'_> {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Records one render pass. Bindings live only as long as the pass.
fn encode_pass(
    frame: &mut Frame,
    depth_view: &wgpu::TextureView,
    viewport: Viewport,
    store: &ResourceStore,
    pipelines: &PipelineStates,
    pass: &PassDescriptor,
) -> RenderResult<()> {
    let (color_load, depth_load, stencil_load) = match pass.clear {
        Some(clear) => (
            wgpu::LoadOp::Clear(clear.wgpu_color()),
            wgpu::LoadOp::Clear(clear.depth),
            wgpu::LoadOp::Clear(clear.stencil),
        ),
        None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load, wgpu::LoadOp::Load),
    };

    let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(pass.label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &frame.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: stencil_load,
                store: wgpu::StoreOp::Store,
            }),
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
    viewport.apply(&mut rpass);

    let Some(draw) = pass.draw else {
        log::trace!("{}: clear only", pass.label);
        return Ok(());
    };

    pipelines.select(&mut rpass, draw.program, pass.depth)?;

    let set = store.binding_set(draw.bindings)?;
    rpass.set_bind_group(0, &set.uniforms, &[]);
    rpass.set_bind_group(1, &set.material, &[]);

    let mesh = store.mesh(draw.mesh)?;
    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    rpass.set_index_buffer(mesh.index_buffer.slice(..), mesh.info.index_format);
    rpass.draw_indexed(0..draw.index_count, 0, 0..1);

    log::trace!("{}: {} indices", pass.label, draw.index_count);
    Ok(())
}
