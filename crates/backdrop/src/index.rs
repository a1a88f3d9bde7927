/// Vertical scroll state of the host document, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset.
    pub offset_y: f64,
    /// Total scrollable height (document height minus viewport height).
    pub scrollable_height: f64,
}

impl ScrollMetrics {
    pub fn new(offset_y: f64, scrollable_height: f64) -> Self {
        Self {
            offset_y,
            scrollable_height,
        }
    }

    /// Scroll position as a fraction of the scrollable height, in `[0, 1]`.
    ///
    /// Content that fits the viewport (no scrollable height) reports 0.
    pub fn fraction(&self) -> f64 {
        if self.scrollable_height.is_nan()
            || self.scrollable_height <= 0.0
            || !self.offset_y.is_finite()
        {
            return 0.0;
        }
        (self.offset_y / self.scrollable_height).clamp(0.0, 1.0)
    }
}

/// Maps a scroll position onto one of `count` equally sized buckets.
///
/// The bottom of the document (fraction 1.0) lands in the last bucket rather
/// than wrapping past it.
pub fn frame_index(metrics: ScrollMetrics, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let bucket = (metrics.fraction() * count as f64).floor() as usize;
    bucket.min(count - 1)
}
