/// Decides which slides get a real playback surface. Everything outside the
/// window renders a static preview image, which bounds concurrently mounted
/// media elements to `2 * radius + 1` no matter how long the feed grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideWindow {
    radius: usize,
}

/// Keep one slide on each side of the active one mounted so a single-step
/// scroll never lands on a black frame.
pub const DEFAULT_WINDOW_RADIUS: usize = 1;

impl Default for SlideWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_RADIUS)
    }
}

impl SlideWindow {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    pub fn is_live(&self, active: usize, index: usize) -> bool {
        active.abs_diff(index) <= self.radius
    }

    /// Inclusive live range clipped to `[0, len)`. Empty when the feed is.
    pub fn live_bounds(&self, active: usize, len: usize) -> Option<(usize, usize)> {
        if len == 0 {
            return None;
        }
        let active = active.min(len - 1);
        let lo = active.saturating_sub(self.radius);
        let hi = (active + self.radius).min(len - 1);
        Some((lo, hi))
    }
}
