//! Scroll-synchronised background frame selection.
//!
//! The crate turns a vertical scroll position into one of `N` preloaded
//! background frames:
//!
//! ```text
//!   scroll event ──▶ scroll_event() (pending flag)
//!                          │ next rendered frame
//!                          ▼
//!   animation_frame(metrics) ──▶ frame_index() ──▶ apply unless transitioning
//!                                                        │
//!                                   tick(now) ◀── 500ms deadline
//! ```
//!
//! Nothing here talks to the GPU; the renderer reads [`BackgroundSwitcher`]
//! state each frame and draws the cross-fade itself.

mod index;
mod preload;
mod switcher;

pub use index::{frame_index, ScrollMetrics};
pub use preload::{preload, Frame, ImageSet};
pub use switcher::{BackgroundSwitcher, FrameChange, TRANSITION_DURATION};

#[derive(Debug, thiserror::Error)]
pub enum BackdropError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: std::path::PathBuf,
        #[source]
        source: image::ImageError,
    },
}
