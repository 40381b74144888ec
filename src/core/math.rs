// Math utilities and helper functions

use glam::Vec2;

/// Tolerance used when comparing accumulated frame timers against their deadline
pub const TIMER_EPSILON: f32 = 1e-4;

/// Linear interpolation between two points
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Move `current` toward `target` by at most `max_delta`
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Whether an accumulated timer has reached its deadline
pub fn deadline_reached(elapsed: f32, duration: f32) -> bool {
    elapsed + TIMER_EPSILON >= duration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_vec2() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, -4.0);
        assert_eq!(lerp_vec2(a, b, 0.0), a);
        assert_eq!(lerp_vec2(a, b, 1.0), b);
        assert_eq!(lerp_vec2(a, b, 0.5), Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_lerp_vec2_clamps_t() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(2.0, 2.0);
        assert_eq!(lerp_vec2(a, b, 3.0), b);
        assert_eq!(lerp_vec2(a, b, -1.0), a);
    }

    #[test]
    fn test_move_toward() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(0.0, -10.0, 3.0), -3.0);
        assert_eq!(move_toward(9.0, 10.0, 3.0), 10.0);
    }

    #[test]
    fn test_approx_equal() {
        assert!(approx_equal(1.0, 1.00001, 0.0001));
        assert!(!approx_equal(1.0, 1.1, 0.01));
    }

    #[test]
    fn test_deadline_reached() {
        assert!(!deadline_reached(0.3, 0.5));
        assert!(deadline_reached(0.5, 0.5));
        // Accumulated 0.1 steps land slightly short of 0.5 in f32
        let elapsed = (0..5).fold(0.0_f32, |acc, _| acc + 0.1);
        assert!(deadline_reached(elapsed, 0.5));
    }
}
