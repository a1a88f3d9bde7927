use std::time::{Duration, Instant};

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed time in seconds since the animator started.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    /// Creates a new time sample.
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Elapsed-time source for the animator, created fresh whenever animation starts.
///
/// The caller supplies `now` so the loop, not the clock, decides what a frame
/// boundary is.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
    frame: u64,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            origin: now,
            frame: 0,
        }
    }

    /// Produces the sample for the frame rendered at `now`.
    pub fn sample(&mut self, now: Instant) -> TimeSample {
        let elapsed = now.saturating_duration_since(self.origin);
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Paces redraws for an optional frames-per-second cap.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_render: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    /// Earliest instant the next frame may be drawn, if capped.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_counts_from_its_origin() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        let first = clock.sample(start);
        let second = clock.sample(start + Duration::from_millis(16));
        assert_eq!(first.seconds, 0.0);
        assert_eq!(first.frame_index, 0);
        assert!((second.seconds - 0.016).abs() < 1e-4);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new(start);
        let sample = clock.sample(start - Duration::from_millis(5));
        assert_eq!(sample.seconds, 0.0);
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(Some(20.0));
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(!scheduler.ready_for_frame(now + Duration::from_millis(10)));
        assert!(scheduler.ready_for_frame(now + Duration::from_millis(50)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(now + Duration::from_secs_f32(1.0 / 20.0))
        );
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let scheduler = FrameScheduler::new(Some(0.0));
        assert!(scheduler.next_deadline().is_none());
    }
}
