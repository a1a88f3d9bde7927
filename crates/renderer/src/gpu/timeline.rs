use std::time::Instant;

use backdrop::TRANSITION_DURATION;

/// Quadratic ease-in-out over `[0, 1]`.
fn ease_in_out(progress: f32) -> f32 {
    let t = progress.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - 2.0 * (1.0 - t) * (1.0 - t)
    }
}

/// Opacities of the outgoing and incoming background frame during one
/// switch. Lasts exactly as long as the switcher ignores further changes, so
/// a fade never has to be interrupted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FadeEnvelope {
    start: Instant,
}

/// Outgoing and incoming opacity at one instant of a fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FadeMix {
    pub outgoing: f32,
    pub incoming: f32,
    pub finished: bool,
}

impl FadeEnvelope {
    pub(crate) fn start(now: Instant) -> Self {
        Self { start: now }
    }

    pub(crate) fn at(&self, now: Instant) -> FadeMix {
        let elapsed = now.saturating_duration_since(self.start);
        let progress = elapsed.as_secs_f32() / TRANSITION_DURATION.as_secs_f32();
        let incoming = ease_in_out(progress);
        FadeMix {
            outgoing: 1.0 - incoming,
            incoming,
            finished: elapsed >= TRANSITION_DURATION,
        }
    }
}
