use crate::config::{MIN_SPAN, TRIM_SEED_RADIUS};
use crate::types::TrimRange;

impl TrimRange {
    /// Seed a range two seconds either side of the playhead, clamped to the media.
    pub fn begin(current_time: f64, duration: f64) -> Self {
        Self {
            start_time: (current_time - TRIM_SEED_RADIUS).max(0.0),
            end_time: (current_time + TRIM_SEED_RADIUS).min(duration),
        }
    }

    /// Move the in-point to `t`, never closer than `MIN_SPAN` to the out-point
    /// and never before 0.
    pub fn with_start(&self, t: f64) -> Self {
        Self {
            start_time: t.min(self.end_time - MIN_SPAN).max(0.0),
            ..*self
        }
    }

    /// Move the out-point to `t`, never closer than `MIN_SPAN` to the in-point.
    pub fn with_end(&self, t: f64) -> Self {
        Self {
            end_time: t.max(self.start_time + MIN_SPAN),
            ..*self
        }
    }

    /// Start handle dragged on the timeline.
    pub fn drag_adjust_start(&self, t: f64) -> Self {
        self.with_start(t)
    }

    /// End handle dragged on the timeline.
    pub fn drag_adjust_end(&self, t: f64) -> Self {
        self.with_end(t)
    }

    /// Length of the kept section.
    pub fn length(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::clamp_time;

    fn assert_valid(range: &TrimRange, duration: f64) {
        assert!(range.start_time >= 0.0, "{range:?}");
        assert!(range.end_time <= duration, "{range:?}");
        assert!(range.length() >= MIN_SPAN - 1e-12, "{range:?}");
    }

    #[test]
    fn begin_seeds_around_playhead() {
        let r = TrimRange::begin(10.0, 100.0);
        assert_eq!(r, TrimRange { start_time: 8.0, end_time: 12.0 });
    }

    #[test]
    fn begin_clamps_to_media_bounds() {
        assert_eq!(
            TrimRange::begin(1.0, 100.0),
            TrimRange { start_time: 0.0, end_time: 3.0 }
        );
        assert_eq!(
            TrimRange::begin(99.0, 100.0),
            TrimRange { start_time: 97.0, end_time: 100.0 }
        );
    }

    #[test]
    fn dragging_end_before_start_stops_at_min_span() {
        let r = TrimRange::begin(10.0, 100.0);
        let r = r.drag_adjust_end(5.0);
        assert_eq!(r, TrimRange { start_time: 8.0, end_time: 8.5 });
    }

    #[test]
    fn dragging_start_past_end_stops_at_min_span() {
        let r = TrimRange { start_time: 8.0, end_time: 12.0 };
        assert_eq!(r.drag_adjust_start(20.0).start_time, 11.5);
        assert_eq!(r.drag_adjust_start(3.0).start_time, 3.0);
    }

    #[test]
    fn set_and_drag_share_the_same_contract() {
        let r = TrimRange { start_time: 2.0, end_time: 6.0 };
        for t in [0.0, 1.0, 5.8, 6.0, 9.0] {
            assert_eq!(r.with_start(t), r.drag_adjust_start(t));
            assert_eq!(r.with_end(t), r.drag_adjust_end(t));
        }
    }

    #[test]
    fn invariants_hold_over_edit_sequences() {
        let duration = 30.0;
        let mut r = TrimRange::begin(15.0, duration);
        let inputs = [-4.0, 0.0, 3.3, 14.9, 15.0, 29.9, 30.0, 45.0, f64::NAN, 7.25];
        for (i, raw) in inputs.iter().enumerate() {
            let t = clamp_time(*raw, duration);
            r = if i % 2 == 0 { r.with_start(t) } else { r.with_end(t) };
            assert_valid(&r, duration);
            r = if i % 2 == 0 {
                r.drag_adjust_end(t)
            } else {
                r.drag_adjust_start(t)
            };
            assert_valid(&r, duration);
        }
    }

    #[test]
    fn length_and_contains() {
        let r = TrimRange { start_time: 1.5, end_time: 4.0 };
        assert_eq!(r.length(), 2.5);
        assert!(r.contains(1.5));
        assert!(r.contains(4.0));
        assert!(!r.contains(4.1));
    }
}
