use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Monotonic stopwatch. `elapsed()` reports seconds since the last restart.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame delta measurement with a hitch cap and FPS smoothing.
pub struct FrameTime {
    pub max_dt: f32,
    pub dt: f32,
    pub total_time: f64,
    pub frame_count: u64,
    clock: Clock,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
    pub smoothed_frame_time_ms: f32,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            max_dt: 0.25,
            dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            clock: Clock::new(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    /// Sample the clock, restart it and return the capped delta.
    pub fn begin_frame(&mut self) -> f32 {
        let elapsed = self.clock.elapsed();
        self.clock.restart();
        self.record(elapsed)
    }

    /// Feed an externally measured delta. Split out so tests can drive it.
    pub fn record(&mut self, elapsed: f32) -> f32 {
        let mut dt = elapsed.max(0.0);
        if dt > self.max_dt {
            log::warn!(
                "Frame took {:.1}ms, capping delta to {}ms",
                dt * 1000.0,
                self.max_dt * 1000.0
            );
            dt = self.max_dt;
        }

        self.dt = dt;
        self.total_time += dt as f64;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f32 = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        dt
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}
