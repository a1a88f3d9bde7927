use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use backdrop::BackgroundSwitcher;
use tracing::{error, info, trace, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::FrameScheduler;
use crate::types::RendererConfig;
use crate::viewport::{DocumentScroll, ViewportDimensions, LINE_HEIGHT};

/// The presentation window: a scrolled document whose background follows the
/// scroll position, with the shader overlay on top.
pub(crate) struct WindowState {
    // Dropped before `window`; the surface borrows its raw handles.
    gpu: GpuState,
    switcher: BackgroundSwitcher,
    document: DocumentScroll,
    window: Arc<Window>,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig, now: Instant) -> Result<Self> {
        let size = window.inner_size();
        let viewport = ViewportDimensions::from_physical(size, window.scale_factor());
        let gpu = GpuState::new(window.as_ref(), size, viewport, config, now)?;
        let document = DocumentScroll::new(config.pages as f64, viewport.height);
        let switcher = BackgroundSwitcher::new(config.images.clone());

        Ok(Self {
            gpu,
            switcher,
            document,
            window,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let viewport = ViewportDimensions::from_physical(new_size, self.window.scale_factor());
        self.document.set_viewport_height(viewport.height);
        self.gpu.resize(new_size, viewport);
    }

    /// Moves the document and schedules one background recomputation for
    /// the next frame, however many inputs arrive before it.
    fn scrolled(&mut self, moved: bool) {
        if !moved {
            return;
        }
        if self.switcher.scroll_event() {
            trace!(offset = self.document.offset(), "scroll recompute scheduled");
        }
        self.window.request_redraw();
    }

    pub(crate) fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let distance = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -(lines as f64) * LINE_HEIGHT,
            MouseScrollDelta::PixelDelta(position) => {
                -position.y / self.window.scale_factor().max(f64::EPSILON)
            }
        };
        let moved = self.document.scroll_by(distance);
        self.scrolled(moved);
    }

    /// Returns true when the key asks the window to close.
    pub(crate) fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed {
            return false;
        }
        let moved = match &event.logical_key {
            Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::Space) => {
                self.document.page_down()
            }
            Key::Named(NamedKey::PageUp) => self.document.page_up(),
            Key::Named(NamedKey::ArrowDown) => self.document.scroll_by(LINE_HEIGHT),
            Key::Named(NamedKey::ArrowUp) => self.document.scroll_by(-LINE_HEIGHT),
            Key::Named(NamedKey::Home) => self.document.home(),
            Key::Named(NamedKey::End) => self.document.end(),
            Key::Named(NamedKey::Escape) => return !event.repeat,
            _ => false,
        };
        self.scrolled(moved);
        false
    }

    pub(crate) fn render_frame(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        if let Some(change) = self.switcher.animation_frame(self.document.metrics(), now) {
            self.gpu.show_frame(change.current, now);
        }
        self.gpu.render(now)
    }

    /// True while frames must keep coming without further input.
    fn wants_frames(&self) -> bool {
        self.gpu.is_animating() || self.switcher.has_pending_scroll()
    }

    pub(crate) fn shutdown(&mut self) {
        self.switcher.stop();
        self.gpu.stop_overlay();
    }
}

pub(crate) fn run_window(config: RendererConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("goldleaf")
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create presentation window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config, Instant::now())
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;
    let mut scheduler = FrameScheduler::new(config.target_fps);

    info!(
        frames = config.images.len(),
        blank = config.images.len() - config.images.loaded_count(),
        pages = config.pages,
        overlay = state.gpu.is_overlay_running(),
        "presentation ready"
    );
    state.window().request_redraw();

    let mut fatal: Option<anyhow::Error> = None;
    let fatal_slot = &mut fatal;
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    state.shutdown();
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if state.handle_key(&event) {
                        state.shutdown();
                        elwt.exit();
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    state.handle_wheel(delta);
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                    state.window().request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    match state.render_frame(now) {
                        Ok(()) => scheduler.mark_rendered(now),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; closing presentation");
                            *fatal_slot = Some(anyhow!("GPU surface ran out of memory"));
                            state.shutdown();
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            state.switcher.tick(now);
            if state.wants_frames() {
                if scheduler.ready_for_frame(now) {
                    trace!("scheduler: issuing redraw now");
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    let ms = deadline.saturating_duration_since(now).as_millis();
                    trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                }
            } else if let Some(deadline) = state.switcher.next_deadline() {
                trace!("scheduler: waiting for transition expiry");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                trace!("scheduler: idle (no redraw requested)");
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    if let Err(err) = run_result {
        return Err(anyhow!("window event loop error: {err}"));
    }
    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
