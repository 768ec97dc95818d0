//! Frame-rate sampling for the frame-displayed callback.
//!
//! A small owned accumulator, threaded through the event handler rather than
//! held in global state: it counts frame presentations and, when enabled,
//! yields one average-FPS measurement per elapsed 5-second wall-clock window,
//! then resets the window. Disabled (the `WPE_DISPLAY_FPS` toggle unset), it
//! does nothing at all.

use std::time::{Duration, Instant};

/// Window length between two measurements.
const SAMPLE_WINDOW: Duration = Duration::from_secs(5);

/// Rate sampler over frame presentations.
#[derive(Debug)]
pub struct FrameRateSampler {
    enabled: bool,
    frames: u32,
    window_started: Instant,
}

impl FrameRateSampler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            frames: 0,
            window_started: Instant::now(),
        }
    }

    /// Records one presented frame. Returns the average FPS figure when a
    /// full sample window has elapsed, `None` otherwise (and always `None`
    /// when sampling is disabled).
    pub fn frame_displayed(&mut self) -> Option<f64> {
        self.tick(Instant::now())
    }

    fn tick(&mut self, now: Instant) -> Option<f64> {
        if !self.enabled {
            return None;
        }

        self.frames += 1;
        let elapsed = now.duration_since(self.window_started);
        if elapsed < SAMPLE_WINDOW {
            return None;
        }

        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_started = now;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_sampler_never_measures() {
        let mut sampler = FrameRateSampler::new(false);
        let start = Instant::now();
        for i in 0..100 {
            assert!(sampler.tick(start + Duration::from_secs(i)).is_none());
        }
    }

    #[test]
    fn test_no_measurement_inside_window() {
        let mut sampler = FrameRateSampler::new(true);
        let start = sampler.window_started;
        for millis in [0, 100, 1000, 4999] {
            assert!(sampler.tick(start + Duration::from_millis(millis)).is_none());
        }
    }

    #[test]
    fn test_one_measurement_per_window() {
        let mut sampler = FrameRateSampler::new(true);
        let start = sampler.window_started;

        // 299 frames inside the window, the 300th lands on the boundary.
        for i in 1..300u64 {
            let t = start + Duration::from_millis(i * 16);
            assert!(sampler.tick(t).is_none());
        }
        let fps = sampler.tick(start + Duration::from_secs(5)).unwrap();
        assert!(fps > 0.0);

        // Window was reset: the very next frame yields nothing.
        assert!(sampler.tick(start + Duration::from_millis(5016)).is_none());
    }

    #[test]
    fn test_measurement_value_matches_frame_count() {
        let mut sampler = FrameRateSampler::new(true);
        let start = sampler.window_started;
        for _ in 0..49 {
            assert!(sampler.tick(start + Duration::from_secs(1)).is_none());
        }
        // 50th frame, exactly 5 seconds in: 50 frames / 5 s = 10 FPS.
        let fps = sampler.tick(start + Duration::from_secs(5)).unwrap();
        assert!((fps - 10.0).abs() < f64::EPSILON);
    }
}
