/// A physical scroll gesture fires dozens of small wheel deltas. This gate
/// accumulates them and emits a single step once the magnitude clears the
/// threshold, then ignores everything until the cooldown has passed.
///
/// Time is passed in by the caller (milliseconds, any monotonic-enough
/// source) so the machine stays clock-free and testable.
pub const WHEEL_THRESHOLD: f64 = 50.0;
pub const COOLDOWN_MS: f64 = 700.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advance,
    Retreat,
}

#[derive(Debug, Clone, Default)]
pub struct WheelGate {
    accumulated: f64,
    /// Timestamp until which the gate is locked. `None` = idle.
    locked_until: Option<f64>,
}

impl WheelGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_delta(&mut self, delta: f64, now_ms: f64) -> Option<Step> {
        if let Some(until) = self.locked_until {
            if now_ms < until {
                return None;
            }
            // Cooldown elapsed: back to idle with a fresh accumulator.
            self.locked_until = None;
            self.accumulated = 0.0;
        }

        if delta == 0.0 || !delta.is_finite() {
            return None;
        }

        self.accumulated += delta;

        if self.accumulated > WHEEL_THRESHOLD {
            self.lock(now_ms);
            Some(Step::Advance)
        } else if self.accumulated < -WHEEL_THRESHOLD {
            self.lock(now_ms);
            Some(Step::Retreat)
        } else {
            None
        }
    }

    fn lock(&mut self, now_ms: f64) {
        self.locked_until = Some(now_ms + COOLDOWN_MS);
        self.accumulated = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_deltas_accumulate_into_one_advance() {
        let mut gate = WheelGate::new();
        assert_eq!(gate.on_delta(10.0, 0.0), None);
        assert_eq!(gate.on_delta(15.0, 5.0), None);
        // 10 + 15 + 30 = 55 > 50
        assert_eq!(gate.on_delta(30.0, 10.0), Some(Step::Advance));
    }

    #[test]
    fn locked_gate_ignores_deltas_until_cooldown() {
        let mut gate = WheelGate::new();
        assert_eq!(gate.on_delta(60.0, 0.0), Some(Step::Advance));
        assert_eq!(gate.on_delta(120.0, 100.0), None);
        assert_eq!(gate.on_delta(120.0, 699.0), None);
        // First event after the cooldown starts a fresh accumulation.
        assert_eq!(gate.on_delta(120.0, 701.0), Some(Step::Advance));
    }

    #[test]
    fn negative_sum_retreats() {
        let mut gate = WheelGate::new();
        assert_eq!(gate.on_delta(-30.0, 0.0), None);
        assert_eq!(gate.on_delta(-25.0, 1.0), Some(Step::Retreat));
    }

    #[test]
    fn opposite_deltas_cancel() {
        let mut gate = WheelGate::new();
        assert_eq!(gate.on_delta(40.0, 0.0), None);
        assert_eq!(gate.on_delta(-40.0, 1.0), None);
        assert_eq!(gate.on_delta(45.0, 2.0), None);
        assert_eq!(gate.on_delta(10.0, 3.0), Some(Step::Advance));
    }

    #[test]
    fn zero_and_nonfinite_deltas_are_ignored() {
        let mut gate = WheelGate::new();
        assert_eq!(gate.on_delta(0.0, 0.0), None);
        assert_eq!(gate.on_delta(f64::NAN, 1.0), None);
        assert_eq!(gate.on_delta(51.0, 2.0), Some(Step::Advance));
    }
}
