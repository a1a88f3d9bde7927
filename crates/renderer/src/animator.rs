//! Lifecycle of the animated shader overlay.
//!
//! [`ShaderAnimator`] drives any [`AnimationSurface`]: it owns the frame clock,
//! skips redundant resizes, and guarantees the surface is released exactly
//! once no matter how often `stop` is called.

use std::time::Instant;

use anyhow::Result;

use crate::runtime::{FrameClock, TimeSample};
use crate::viewport::ViewportDimensions;

/// Render target the animator draws into once per frame.
pub trait AnimationSurface {
    /// Reallocates the target at `width`x`height` device pixels.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
    /// Writes the time uniform and draws the full-screen quad.
    fn draw(&mut self, sample: TimeSample) -> Result<()>;
    /// Frees the render target. Buffers and pipelines live until the surface
    /// itself is dropped, which `ShaderAnimator::stop` does right after.
    fn release(&mut self);
}

pub struct ShaderAnimator<S: AnimationSurface> {
    surface: Option<S>,
    clock: FrameClock,
    render_size: (u32, u32),
}

impl<S: AnimationSurface> ShaderAnimator<S> {
    /// Sizes `surface` for `viewport` and starts the clock at `now`.
    ///
    /// On failure the surface is released and nothing keeps running.
    pub fn start(mut surface: S, viewport: ViewportDimensions, now: Instant) -> Result<Self> {
        let render_size = viewport.render_size();
        if let Err(err) = surface.resize(render_size.0, render_size.1) {
            surface.release();
            return Err(err.context("failed to size animation surface"));
        }
        tracing::debug!(
            width = render_size.0,
            height = render_size.1,
            pixel_ratio = viewport.effective_pixel_ratio(),
            "shader animator started"
        );
        Ok(Self {
            surface: Some(surface),
            clock: FrameClock::new(now),
            render_size,
        })
    }

    pub fn is_running(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn render_size(&self) -> (u32, u32) {
        self.render_size
    }

    /// Follows a viewport change. Unchanged render sizes and stopped
    /// animators are left alone.
    pub fn resize(&mut self, viewport: ViewportDimensions) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let render_size = viewport.render_size();
        if render_size == self.render_size {
            return Ok(());
        }
        surface.resize(render_size.0, render_size.1)?;
        self.render_size = render_size;
        tracing::debug!(
            width = render_size.0,
            height = render_size.1,
            "shader animator resized"
        );
        Ok(())
    }

    /// Draws the frame for `now`; returns the sample used, or `None` once
    /// stopped.
    pub fn frame(&mut self, now: Instant) -> Result<Option<TimeSample>> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(None);
        };
        let sample = self.clock.sample(now);
        surface.draw(sample)?;
        Ok(Some(sample))
    }

    /// Releases the surface and halts the animation. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::debug!("shader animator stopped");
        }
    }
}

impl<S: AnimationSurface> Drop for ShaderAnimator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct Calls {
        resizes: Vec<(u32, u32)>,
        draws: Vec<TimeSample>,
        releases: usize,
        dropped: usize,
    }

    struct CountingSurface {
        calls: Rc<RefCell<Calls>>,
        fail_resize: bool,
    }

    impl CountingSurface {
        fn new() -> (Self, Rc<RefCell<Calls>>) {
            let calls = Rc::new(RefCell::new(Calls::default()));
            (
                Self {
                    calls: calls.clone(),
                    fail_resize: false,
                },
                calls,
            )
        }
    }

    impl AnimationSurface for CountingSurface {
        fn resize(&mut self, width: u32, height: u32) -> Result<()> {
            if self.fail_resize {
                anyhow::bail!("texture too large");
            }
            self.calls.borrow_mut().resizes.push((width, height));
            Ok(())
        }

        fn draw(&mut self, sample: TimeSample) -> Result<()> {
            self.calls.borrow_mut().draws.push(sample);
            Ok(())
        }

        fn release(&mut self) {
            self.calls.borrow_mut().releases += 1;
        }
    }

    impl Drop for CountingSurface {
        fn drop(&mut self) {
            self.calls.borrow_mut().dropped += 1;
        }
    }

    fn viewport(width: f64, height: f64, ratio: f64) -> ViewportDimensions {
        ViewportDimensions::new(width, height, ratio)
    }

    #[test]
    fn start_sizes_surface_at_capped_ratio() {
        let (surface, calls) = CountingSurface::new();
        let animator =
            ShaderAnimator::start(surface, viewport(800.0, 600.0, 3.0), Instant::now()).unwrap();
        assert!(animator.is_running());
        assert_eq!(animator.render_size(), (1600, 1200));
        assert_eq!(calls.borrow().resizes, vec![(1600, 1200)]);
    }

    #[test]
    fn frames_advance_time_from_start() {
        let (surface, calls) = CountingSurface::new();
        let start = Instant::now();
        let mut animator = ShaderAnimator::start(surface, viewport(64.0, 64.0, 1.0), start).unwrap();

        animator.frame(start).unwrap();
        let later = animator
            .frame(start + Duration::from_millis(500))
            .unwrap()
            .expect("running");
        assert!((later.seconds - 0.5).abs() < 1e-4);
        assert_eq!(later.frame_index, 1);
        assert_eq!(calls.borrow().draws.len(), 2);
        assert_eq!(calls.borrow().draws[0].seconds, 0.0);
    }

    #[test]
    fn resize_with_same_dimensions_is_noop() {
        let (surface, calls) = CountingSurface::new();
        let mut animator =
            ShaderAnimator::start(surface, viewport(640.0, 480.0, 1.0), Instant::now()).unwrap();
        animator.resize(viewport(640.0, 480.0, 1.0)).unwrap();
        animator.resize(viewport(640.0, 480.0, 1.0)).unwrap();
        assert_eq!(calls.borrow().resizes.len(), 1);

        animator.resize(viewport(1024.0, 768.0, 1.0)).unwrap();
        assert_eq!(calls.borrow().resizes.last(), Some(&(1024, 768)));
        assert_eq!(animator.render_size(), (1024, 768));
    }

    #[test]
    fn stop_twice_releases_once() {
        let (surface, calls) = CountingSurface::new();
        let mut animator =
            ShaderAnimator::start(surface, viewport(320.0, 200.0, 1.0), Instant::now()).unwrap();
        animator.stop();
        animator.stop();
        drop(animator);
        assert_eq!(calls.borrow().releases, 1);
    }

    #[test]
    fn stop_drops_surface_after_release() {
        let (surface, calls) = CountingSurface::new();
        let mut animator =
            ShaderAnimator::start(surface, viewport(320.0, 200.0, 1.0), Instant::now()).unwrap();
        assert_eq!(calls.borrow().dropped, 0);

        animator.stop();
        assert!(animator.surface().is_none());
        assert_eq!(calls.borrow().releases, 1);
        assert_eq!(calls.borrow().dropped, 1);

        drop(animator);
        assert_eq!(calls.borrow().dropped, 1);
    }

    #[test]
    fn restart_begins_a_fresh_clock() {
        let start = Instant::now();
        let (surface, _) = CountingSurface::new();
        let mut first = ShaderAnimator::start(surface, viewport(64.0, 64.0, 1.0), start).unwrap();
        first.frame(start).unwrap();
        first.frame(start + Duration::from_secs(3)).unwrap();
        first.stop();

        let restart = start + Duration::from_secs(5);
        let (surface, calls) = CountingSurface::new();
        let mut second = ShaderAnimator::start(surface, viewport(64.0, 64.0, 1.0), restart).unwrap();
        let sample = second
            .frame(restart + Duration::from_millis(250))
            .unwrap()
            .expect("running");
        assert!((sample.seconds - 0.25).abs() < 1e-4);
        assert_eq!(sample.frame_index, 0);
        assert_eq!(calls.borrow().draws.len(), 1);
    }

    #[test]
    fn stopped_animator_ignores_frames_and_resizes() {
        let (surface, calls) = CountingSurface::new();
        let start = Instant::now();
        let mut animator = ShaderAnimator::start(surface, viewport(320.0, 200.0, 1.0), start).unwrap();
        animator.stop();

        assert!(!animator.is_running());
        assert!(animator.frame(start + Duration::from_secs(1)).unwrap().is_none());
        animator.resize(viewport(1920.0, 1080.0, 2.0)).unwrap();
        assert!(calls.borrow().draws.is_empty());
        assert_eq!(calls.borrow().resizes.len(), 1);
    }

    #[test]
    fn drop_releases_running_surface() {
        let (surface, calls) = CountingSurface::new();
        let animator =
            ShaderAnimator::start(surface, viewport(320.0, 200.0, 1.0), Instant::now()).unwrap();
        drop(animator);
        assert_eq!(calls.borrow().releases, 1);
    }

    #[test]
    fn failed_start_releases_surface() {
        let (mut surface, calls) = CountingSurface::new();
        surface.fail_resize = true;
        let result = ShaderAnimator::start(surface, viewport(320.0, 200.0, 1.0), Instant::now());
        assert!(result.is_err());
        assert_eq!(calls.borrow().releases, 1);
    }
}
