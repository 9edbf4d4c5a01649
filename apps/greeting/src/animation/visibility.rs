//! One-shot visibility sensor for a screen region.

/// Fraction of a region that must be in view before it counts as visible.
pub const VISIBILITY_THRESHOLD: f32 = 0.3;

/// Turns visible-area ratios reported by the client into a boolean signal.
/// After the first `true` the region is no longer observed.
#[derive(Debug, Clone)]
pub struct VisibilitySensor {
    threshold: f32,
    observing: bool,
}

impl Default for VisibilitySensor {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

impl VisibilitySensor {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            observing: true,
        }
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Returns the signal for this report, or `None` once observation stopped.
    pub fn report(&mut self, ratio: f32) -> Option<bool> {
        if !self.observing {
            return None;
        }
        let visible = ratio >= self.threshold;
        if visible {
            self.observing = false;
        }
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_reports_false() {
        let mut sensor = VisibilitySensor::default();
        assert_eq!(sensor.report(0.0), Some(false));
        assert_eq!(sensor.report(0.29), Some(false));
        assert!(sensor.is_observing());
    }

    #[test]
    fn test_crossing_threshold_fires_once_then_stops() {
        let mut sensor = VisibilitySensor::default();
        assert_eq!(sensor.report(0.3), Some(true));
        assert!(!sensor.is_observing());
        assert_eq!(sensor.report(1.0), None);
        assert_eq!(sensor.report(0.0), None);
    }
}
