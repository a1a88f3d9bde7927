use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use crate::animator::ShaderAnimator;
use crate::compile::compile_vertex_shader;
use crate::types::RendererConfig;
use crate::viewport::ViewportDimensions;

use super::backdrop::BackdropStack;
use super::context::GpuContext;
use super::layer::GpuLayer;

/// Everything the presentation window draws: the background stack and, when
/// it could be started, the animated overlay.
pub(crate) struct GpuState {
    // Drop order: GPU resources before the context that owns the device.
    animator: Option<ShaderAnimator<GpuLayer>>,
    backdrop: BackdropStack,
    context: GpuContext,
    frames_since_last_update: u32,
    last_fps_update: Instant,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        viewport: ViewportDimensions,
        config: &RendererConfig,
        now: Instant,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size)?;
        let vertex_module = compile_vertex_shader(&context.device);

        let backdrop = BackdropStack::new(
            &context.device,
            &context.queue,
            &vertex_module,
            context.surface_format,
            context.max_texture_dimension,
            &config.images,
        )?;

        let animator = if config.constrained {
            debug!("constrained viewport; shader overlay disabled");
            None
        } else {
            match start_animator(&context, &vertex_module, viewport, now) {
                Ok(animator) => Some(animator),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "shader overlay unavailable; showing backdrop only");
                    None
                }
            }
        };

        Ok(Self {
            animator,
            backdrop,
            context,
            frames_since_last_update: 0,
            last_fps_update: now,
        })
    }

    pub(crate) fn is_overlay_running(&self) -> bool {
        self.animator
            .as_ref()
            .is_some_and(|animator| animator.is_running())
    }

    /// True while something on screen changes without input.
    pub(crate) fn is_animating(&self) -> bool {
        self.is_overlay_running() || self.backdrop.is_fading()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>, viewport: ViewportDimensions) {
        self.context.resize(new_size);
        if !self.is_overlay_running() {
            return;
        }
        if let Some(animator) = self.animator.as_mut() {
            if let Err(err) = animator.resize(viewport) {
                warn!(error = %format!("{err:#}"), "failed to resize shader overlay; stopping it");
                animator.stop();
            }
        }
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Cross-fades the background to `index`.
    pub(crate) fn show_frame(&mut self, index: usize, now: Instant) {
        if index != self.backdrop.current() {
            debug!(index, "cross-fading background frame");
        }
        self.backdrop.show(index, now);
    }

    pub(crate) fn stop_overlay(&mut self) {
        if let Some(animator) = self.animator.as_mut() {
            animator.stop();
        }
    }

    pub(crate) fn render(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        self.frames_since_last_update += 1;
        let elapsed_since_fps_update = now.saturating_duration_since(self.last_fps_update);
        if elapsed_since_fps_update >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed_since_fps_update.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = fps.round(),
                frame = self.backdrop.current(),
                crossfading = self.backdrop.is_fading(),
                overlay = self.is_overlay_running(),
                "render stats"
            );
        }

        if let Some(animator) = self.animator.as_mut() {
            if let Err(err) = animator.frame(now) {
                warn!(error = %format!("{err:#}"), "shader overlay failed to draw; stopping it");
                animator.stop();
            }
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let surface_size = (self.context.config.width, self.context.config.height);
        self.backdrop
            .encode(&self.context.queue, &mut encoder, &view, surface_size, now);

        if let Some(layer) = self.animator.as_ref().and_then(|animator| animator.surface()) {
            layer.composite(&mut encoder, &view);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn start_animator(
    context: &GpuContext,
    vertex_module: &wgpu::ShaderModule,
    viewport: ViewportDimensions,
    now: Instant,
) -> Result<ShaderAnimator<GpuLayer>> {
    let layer = GpuLayer::new(
        &context.device,
        &context.queue,
        vertex_module,
        context.surface_format,
        context.max_texture_dimension,
    )?;
    let animator = ShaderAnimator::start(layer, viewport, now)?;
    if let Some((width, height)) = animator.surface().and_then(GpuLayer::size) {
        debug!(width, height, "shader overlay layer allocated");
    }
    Ok(animator)
}
