//! Renderer crate for goldleaf.
//!
//! The crate glues the `winit` presentation window, the `wgpu` background
//! stack and the animated liquid-gold overlay together. The overall flow is:
//!
//! ```text
//!   CLI / goldleaf
//!          │ RendererConfig (preloaded ImageSet)
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                        │                                    │
//!                        ├─ DocumentScroll ─▶ BackgroundSwitcher ─▶ BackdropStack
//!                        └─ ShaderAnimator<GpuLayer> ─────────────▶ additive composite
//! ```
//!
//! `WindowState` owns all GPU resources, while `Renderer` is the thin entry
//! point. The overlay maths also exist on the CPU ([`noise`]) so stills can be
//! exported without a GPU.

mod animator;
mod compile;
mod gpu;
pub mod noise;
mod runtime;
mod types;
mod viewport;
mod window;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use animator::{AnimationSurface, ShaderAnimator};
pub use runtime::{FrameClock, FrameScheduler, TimeSample};
pub use types::RendererConfig;
pub use viewport::{DocumentScroll, ViewportDimensions, LINE_HEIGHT, MAX_PIXEL_RATIO};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the presentation window and blocks until it is closed.
    ///
    /// Fails if no window or GPU device can be created. A shader overlay that
    /// fails to start is not an error; the backdrop is shown on its own.
    pub fn run(&mut self) -> Result<()> {
        window::run_window(self.config.clone())
    }
}

/// Renders the overlay at `time` seconds on the CPU and writes it to `path`.
///
/// The format follows the file extension.
pub fn export_still(path: &Path, width: u32, height: u32, time: f32) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let image = noise::render_still(width, height, time);
    image
        .save(path)
        .with_context(|| format!("failed to write still frame to {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        time,
        "exported still frame"
    );
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_still_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stills/frame.png");
        let written = export_still(&path, 24, 16, 2.0).expect("export");
        assert_eq!(written, path);

        let decoded = image::open(&path).expect("decode still").to_rgba8();
        assert_eq!(decoded.dimensions(), (24, 16));
        assert_eq!(decoded, noise::render_still(24, 16, 2.0));
    }

    #[test]
    fn export_still_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        assert!(export_still(&dir.path().join("frame.unknown"), 4, 4, 0.0).is_err());
    }
}
