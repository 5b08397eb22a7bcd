use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::error::RenderResult;
use crate::frame::{Renderer, RendererConfig};
use crate::input::platform::winit::translate_key_event;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "skybox".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives frames until it closes or a frame fails.
    ///
    /// The first fatal error is returned after the renderer has been torn down.
    pub fn run(config: RuntimeConfig, renderer: RendererConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<'this>,
}

struct AppState {
    config: RuntimeConfig,
    renderer_config: RendererConfig,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, renderer_config: RendererConfig) -> Self {
        Self {
            config,
            renderer_config,
            entry: None,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let renderer_config = self.renderer_config.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            renderer_builder: |w| {
                let size = w.inner_size();
                pollster::block_on(Renderer::new(w, size.width, size.height, renderer_config))
            },
        }
        .try_build()
        .context("failed to initialize renderer")?;

        self.entry = Some(entry);
        Ok(())
    }

    /// Tears the renderer down, records the error, and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.entry = None;
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }
}

/// Forwards a resize. When it ends a minimise the clock restarts from now,
/// and a redraw restarts the loop.
fn resize(entry: &mut WindowEntry, width: u32, height: u32) -> RenderResult<()> {
    entry.with_mut(|fields| {
        let was_suspended = fields.renderer.device().is_suspended();
        fields.renderer.on_resize(width, height)?;
        if resumes_drawing(was_suspended, fields.renderer.device().is_suspended()) {
            fields.clock.reset();
            fields.window.request_redraw();
        }
        Ok(())
    })
}

fn resumes_drawing(was_suspended: bool, suspended: bool) -> bool {
    was_suspended && !suspended
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; present() paces the loop. A minimised window
        // waits for the resize that brings it back.
        if let Some(entry) = &self.entry {
            if !entry.borrow_renderer().device().is_suspended() {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let result = match &event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.entry = None;
                event_loop.exit();
                return;
            }

            WindowEvent::Resized(size) => {
                resize(entry, size.width, size.height).context("resize failed")
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                resize(entry, size.width, size.height).context("resize failed")
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let (key, state) = translate_key_event(event);
                entry.with_renderer_mut(|r| r.on_key(key, state));
                Ok(())
            }

            WindowEvent::RedrawRequested => entry
                .with_mut(|fields| {
                    let time = fields.clock.tick();
                    fields.renderer.frame(&time)
                })
                .map(|_| ())
                .context("frame failed"),

            _ => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }
}
