/// Fixed timestep frame clock
///
/// Accumulates variable frame times and hands out a whole number of fixed
/// controller ticks per frame, so the controller and movement system always
/// advance by the same `dt`.

/// Target controller/update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of fixed steps per frame to prevent spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Frame timing state
#[derive(Debug)]
pub struct FrameClock {
    /// Accumulated time for fixed timestep updates
    accumulator: f32,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,
}

impl FrameClock {
    /// Create a new frame clock
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Begin a new frame that took `frame_time` seconds, returns the number
    /// of fixed updates to run
    pub fn begin_frame(&mut self, frame_time: f32) -> u32 {
        self.frame_count += 1;

        self.accumulator += frame_time.max(0.0);

        let mut updates = 0;
        while self.accumulator >= FIXED_TIMESTEP && updates < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP;
            updates += 1;
        }

        // Drop the backlog instead of carrying it into the next frame
        if updates == MAX_STEPS_PER_FRAME {
            self.accumulator = self.accumulator.min(FIXED_TIMESTEP);
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get the fixed timestep for updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_creation() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.update_count(), 0);
    }

    #[test]
    fn test_fixed_timestep() {
        let clock = FrameClock::new();
        assert!((clock.fixed_timestep() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_update_accumulation() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.begin_frame(FIXED_TIMESTEP * 0.5), 0);
        assert_eq!(clock.begin_frame(FIXED_TIMESTEP * 0.6), 1);
        assert_eq!(clock.update_count(), 1);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_max_steps_limit() {
        let mut clock = FrameClock::new();
        // 300ms would allow 18 updates
        assert_eq!(clock.begin_frame(0.3), MAX_STEPS_PER_FRAME);
        assert_eq!(clock.update_count(), MAX_STEPS_PER_FRAME as u64);

        // The backlog is dropped, so the next short frame runs at most one step
        assert!(clock.begin_frame(0.0) <= 1);
    }
}
