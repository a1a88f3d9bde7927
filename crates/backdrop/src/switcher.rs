use std::path::Path;
use std::time::{Duration, Instant};

use crate::index::{frame_index, ScrollMetrics};
use crate::preload::{preload, ImageSet};

/// Window after an index change during which new indices are dropped.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(500);

/// Emitted whenever the switcher moves to a new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChange {
    pub previous: usize,
    pub current: usize,
    pub started_at: Instant,
}

/// Selects the current background frame from the scroll position.
///
/// All methods take the caller's notion of `now`, so the deferred transition
/// expiry is a deadline checked by [`BackgroundSwitcher::tick`] rather than a
/// timer thread.
#[derive(Debug)]
pub struct BackgroundSwitcher {
    images: ImageSet,
    current: usize,
    transitioning: bool,
    transition_deadline: Option<Instant>,
    scroll_pending: bool,
    stopped: bool,
}

impl BackgroundSwitcher {
    pub fn new(images: ImageSet) -> Self {
        Self {
            images,
            current: 0,
            transitioning: false,
            transition_deadline: None,
            scroll_pending: false,
            stopped: false,
        }
    }

    /// Preloads every image and returns an active switcher.
    pub fn init<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self::new(preload(paths))
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn frame_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Records a raw scroll event.
    ///
    /// Returns `true` when this call scheduled a recomputation for the next
    /// frame, `false` when one was already pending (or the switcher stopped).
    pub fn scroll_event(&mut self) -> bool {
        if self.stopped || self.scroll_pending {
            return false;
        }
        self.scroll_pending = true;
        true
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.scroll_pending
    }

    /// Runs the recomputation scheduled by [`Self::scroll_event`], if any.
    pub fn animation_frame(&mut self, metrics: ScrollMetrics, now: Instant) -> Option<FrameChange> {
        if !std::mem::take(&mut self.scroll_pending) {
            self.tick(now);
            return None;
        }
        self.on_scroll(metrics, now)
    }

    /// Recomputes the frame index from `metrics` and applies it unless a
    /// transition is still running. Indices computed during a transition are
    /// dropped, not queued.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> Option<FrameChange> {
        if self.stopped {
            return None;
        }
        self.tick(now);

        let index = frame_index(metrics, self.images.len());
        if index == self.current || self.transitioning {
            if index != self.current {
                tracing::trace!(
                    index,
                    current = self.current,
                    "transition in flight; dropping frame change"
                );
            }
            return None;
        }

        let previous = std::mem::replace(&mut self.current, index);
        self.transitioning = true;
        self.transition_deadline = Some(now + TRANSITION_DURATION);
        tracing::debug!(
            previous,
            current = index,
            fraction = metrics.fraction(),
            "background frame changed"
        );
        Some(FrameChange {
            previous,
            current: index,
            started_at: now,
        })
    }

    /// Fires the deferred transition expiry once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        if let Some(deadline) = self.transition_deadline {
            if now >= deadline {
                self.transition_deadline = None;
                self.transitioning = false;
            }
        }
    }

    /// Deadline of the pending transition expiry, for callers that want to
    /// wake up exactly when it fires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.transition_deadline
    }

    /// Cancels pending work; no later call mutates the switcher.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.scroll_pending = false;
        self.transition_deadline = None;
    }
}
