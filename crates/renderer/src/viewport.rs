use backdrop::ScrollMetrics;
use winit::dpi::PhysicalSize;

/// Device pixel ratios above this are rendered at this ratio.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Distance scrolled per wheel "line", in logical pixels.
pub const LINE_HEIGHT: f64 = 48.0;

/// Viewport size in logical pixels plus the display's pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDimensions {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl ViewportDimensions {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self::new(
            size.width as f64 / scale,
            size.height as f64 / scale,
            scale,
        )
    }

    pub fn effective_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Size of the render surface in device pixels, never below 1x1.
    pub fn render_size(&self) -> (u32, u32) {
        let ratio = self.effective_pixel_ratio();
        let width = (self.width * ratio).round().max(1.0) as u32;
        let height = (self.height * ratio).round().max(1.0) as u32;
        (width, height)
    }
}

/// Scroll position over a document `pages` viewports tall.
///
/// Stands in for the page a browser would scroll: the window is the viewport
/// and the document exists only as a height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScroll {
    offset: f64,
    pages: f64,
    viewport_height: f64,
}

impl DocumentScroll {
    pub fn new(pages: f64, viewport_height: f64) -> Self {
        Self {
            offset: 0.0,
            pages: pages.max(1.0),
            viewport_height: viewport_height.max(0.0),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scrollable_height(&self) -> f64 {
        (self.viewport_height * self.pages - self.viewport_height).max(0.0)
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.offset, self.scrollable_height())
    }

    /// Updates the viewport height, keeping the same scroll fraction.
    pub fn set_viewport_height(&mut self, height: f64) {
        let fraction = self.metrics().fraction();
        self.viewport_height = height.max(0.0);
        self.offset = fraction * self.scrollable_height();
    }

    /// Scrolls by `delta` logical pixels; returns whether the offset moved.
    pub fn scroll_by(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        self.scroll_to(self.offset + delta)
    }

    pub fn scroll_to(&mut self, offset: f64) -> bool {
        let clamped = offset.clamp(0.0, self.scrollable_height());
        let moved = (clamped - self.offset).abs() > f64::EPSILON;
        self.offset = clamped;
        moved
    }

    pub fn page_down(&mut self) -> bool {
        self.scroll_by(self.viewport_height)
    }

    pub fn page_up(&mut self) -> bool {
        self.scroll_by(-self.viewport_height)
    }

    pub fn home(&mut self) -> bool {
        self.scroll_to(0.0)
    }

    pub fn end(&mut self) -> bool {
        self.scroll_to(self.scrollable_height())
    }
}
