use backdrop::ImageSet;

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and the show config: which frames to
/// display, how tall the scrolled document is, and whether the shader overlay
/// should run at all.
#[derive(Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Preloaded background frames in scroll order.
    pub images: ImageSet,
    /// Document height in viewport heights.
    pub pages: f32,
    /// Optional FPS cap; None = render every callback.
    pub target_fps: Option<f32>,
    /// Constrained viewports render the backdrop without the shader overlay.
    pub constrained: bool,
}

impl RendererConfig {
    pub fn new(images: ImageSet) -> Self {
        let pages = images.len().max(1) as f32;
        Self {
            surface_size: (1280, 720),
            images,
            pages,
            target_fps: None,
            constrained: false,
        }
    }
}
