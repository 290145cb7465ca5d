//! Timeline track interaction: mapping pointer positions to times and
//! routing drags to the playhead or one of the two trim handles.

use crate::time::{clamp_time, format_coarse};
use crate::types::TrimRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DragTarget {
    Playhead,
    TrimStart,
    TrimEnd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrimHandle {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragTarget),
}

/// What a pointer event asks the session to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    Seek { time: f64 },
    TrimChanged { range: TrimRange },
}

/// Horizontal extent of the track element in client coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Linear map from a client x coordinate to a media time, clamped to
    /// `[0, duration]`. A collapsed track maps everything to 0.
    pub fn time_at(&self, client_x: f64, duration: f64) -> f64 {
        if !(self.width.is_finite() && self.width > 0.0) {
            return 0.0;
        }
        let fraction = (client_x - self.left) / self.width;
        clamp_time(fraction * duration, duration)
    }
}

/// Document-wide pointer move/up subscription.
///
/// Attached only while a drag is in progress.
pub trait PointerListeners {
    fn attach(&mut self);
    fn detach(&mut self);
}

impl PointerListeners for () {
    fn attach(&mut self) {}
    fn detach(&mut self) {}
}

/// Drag state machine for one timeline track.
///
/// `Idle` -> `Dragging(target)` on pointer down, back to `Idle` on pointer up.
/// The global listeners are detached on every return to `Idle` and when the
/// interaction is dropped mid-drag.
#[derive(Debug, Default)]
pub struct TimelineInteraction<L: PointerListeners = ()> {
    state: DragState,
    listeners: L,
}

impl<L: PointerListeners> TimelineInteraction<L> {
    pub fn new(listeners: L) -> Self {
        Self {
            state: DragState::Idle,
            listeners,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    /// Pointer pressed on the track background: grab the playhead and seek.
    pub fn pointer_down_track(
        &mut self,
        client_x: f64,
        track: TrackGeometry,
        duration: f64,
    ) -> TimelineEvent {
        self.begin_drag(DragTarget::Playhead);
        TimelineEvent::Seek {
            time: track.time_at(client_x, duration),
        }
    }

    /// Pointer pressed on a trim handle. The press does not reach the track,
    /// so the playhead stays put.
    pub fn pointer_down_handle(&mut self, handle: TrimHandle) {
        let target = match handle {
            TrimHandle::Start => DragTarget::TrimStart,
            TrimHandle::End => DragTarget::TrimEnd,
        };
        self.begin_drag(target);
    }

    /// Pointer moved anywhere in the document.
    ///
    /// Handle drags emit nothing when there is no trim range to adjust.
    pub fn pointer_move(
        &mut self,
        client_x: f64,
        track: TrackGeometry,
        duration: f64,
        trim: Option<TrimRange>,
    ) -> Option<TimelineEvent> {
        let DragState::Dragging(target) = self.state else {
            return None;
        };
        let time = track.time_at(client_x, duration);
        match (target, trim) {
            (DragTarget::Playhead, _) => Some(TimelineEvent::Seek { time }),
            (DragTarget::TrimStart, Some(range)) => Some(TimelineEvent::TrimChanged {
                range: range.drag_adjust_start(time),
            }),
            (DragTarget::TrimEnd, Some(range)) => Some(TimelineEvent::TrimChanged {
                range: range.drag_adjust_end(time),
            }),
            (_, None) => None,
        }
    }

    /// Pointer released anywhere in the document.
    pub fn pointer_up(&mut self) {
        if let DragState::Dragging(target) = self.state {
            tracing::debug!(?target, "drag finished");
            self.listeners.detach();
            self.state = DragState::Idle;
        }
    }

    fn begin_drag(&mut self, target: DragTarget) {
        if self.state == DragState::Idle {
            self.listeners.attach();
        }
        tracing::debug!(?target, "drag started");
        self.state = DragState::Dragging(target);
    }
}

impl<L: PointerListeners> Drop for TimelineInteraction<L> {
    fn drop(&mut self) {
        if self.is_dragging() {
            self.listeners.detach();
        }
    }
}

// ---------------------------------------------------------------------------
// Track rendering helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeMarker {
    pub time: f64,
    pub percent: f64,
    pub label: String,
}

/// Marker spacing: every 5 seconds under a minute, otherwise every 30.
pub fn marker_interval(duration: f64) -> f64 {
    if duration < 60.0 {
        5.0
    } else {
        30.0
    }
}

/// Labelled ticks from 0 up to and including `duration`.
pub fn time_markers(duration: f64) -> Vec<TimeMarker> {
    if !duration.is_finite() || duration < 0.0 {
        return Vec::new();
    }
    let interval = marker_interval(duration);
    (0u64..)
        .map(|i| i as f64 * interval)
        .take_while(|&time| time <= duration)
        .map(|time| TimeMarker {
            time,
            percent: percent_of(time, duration),
            label: format_coarse(time),
        })
        .collect()
}

/// Playhead position as a percentage of the track width.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    percent_of(current_time, duration)
}

/// Left and right edges of the trim highlight. Without a range the whole
/// track is selected.
pub fn trim_percents(trim: Option<TrimRange>, duration: f64) -> (f64, f64) {
    match trim {
        Some(range) => (
            percent_of(range.start_time, duration),
            percent_of(range.end_time, duration),
        ),
        None => (0.0, 100.0),
    }
}

fn percent_of(time: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        time / duration * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingListeners {
        attached: bool,
        attach_calls: usize,
        detach_calls: usize,
    }

    impl PointerListeners for CountingListeners {
        fn attach(&mut self) {
            assert!(!self.attached, "listeners attached twice");
            self.attached = true;
            self.attach_calls += 1;
        }

        fn detach(&mut self) {
            assert!(self.attached, "detach without attach");
            self.attached = false;
            self.detach_calls += 1;
        }
    }

    struct DropProbe<'a> {
        detached: &'a std::cell::Cell<bool>,
    }

    impl PointerListeners for DropProbe<'_> {
        fn attach(&mut self) {}
        fn detach(&mut self) {
            self.detached.set(true);
        }
    }

    const TRACK: TrackGeometry = TrackGeometry {
        left: 100.0,
        width: 400.0,
    };

    #[test]
    fn track_press_seeks_and_grabs_playhead() {
        let mut ui = TimelineInteraction::new(CountingListeners::default());
        let event = ui.pointer_down_track(300.0, TRACK, 100.0);
        assert_eq!(event, TimelineEvent::Seek { time: 50.0 });
        assert_eq!(ui.state(), DragState::Dragging(DragTarget::Playhead));
        assert!(ui.listeners().attached);
    }

    #[test]
    fn playhead_drag_seeks_with_clamping() {
        let mut ui = TimelineInteraction::new(());
        ui.pointer_down_track(100.0, TRACK, 60.0);
        assert_eq!(
            ui.pointer_move(200.0, TRACK, 60.0, None),
            Some(TimelineEvent::Seek { time: 15.0 })
        );
        assert_eq!(
            ui.pointer_move(-50.0, TRACK, 60.0, None),
            Some(TimelineEvent::Seek { time: 0.0 })
        );
        assert_eq!(
            ui.pointer_move(9000.0, TRACK, 60.0, None),
            Some(TimelineEvent::Seek { time: 60.0 })
        );
    }

    #[test]
    fn handle_press_does_not_seek() {
        let mut ui = TimelineInteraction::new(CountingListeners::default());
        ui.pointer_down_handle(TrimHandle::Start);
        assert_eq!(ui.state(), DragState::Dragging(DragTarget::TrimStart));
        assert_eq!(ui.listeners().attach_calls, 1);
    }

    #[test]
    fn end_handle_drag_is_clamped_against_start() {
        let trim = TrimRange::begin(10.0, 100.0);
        let mut ui = TimelineInteraction::new(());
        ui.pointer_down_handle(TrimHandle::End);
        // 5s on a 100s track
        let event = ui.pointer_move(120.0, TRACK, 100.0, Some(trim));
        assert_eq!(
            event,
            Some(TimelineEvent::TrimChanged {
                range: TrimRange { start_time: 8.0, end_time: 8.5 }
            })
        );
    }

    #[test]
    fn start_handle_drag_moves_start_only() {
        let trim = TrimRange { start_time: 10.0, end_time: 20.0 };
        let mut ui = TimelineInteraction::new(());
        ui.pointer_down_handle(TrimHandle::Start);
        let event = ui.pointer_move(120.0, TRACK, 100.0, Some(trim));
        assert_eq!(
            event,
            Some(TimelineEvent::TrimChanged {
                range: TrimRange { start_time: 5.0, end_time: 20.0 }
            })
        );
        let event = ui.pointer_move(500.0, TRACK, 100.0, Some(trim));
        assert_eq!(
            event,
            Some(TimelineEvent::TrimChanged {
                range: TrimRange { start_time: 19.5, end_time: 20.0 }
            })
        );
    }

    #[test]
    fn handle_drag_without_range_emits_nothing() {
        let mut ui = TimelineInteraction::new(());
        ui.pointer_down_handle(TrimHandle::End);
        assert_eq!(ui.pointer_move(300.0, TRACK, 100.0, None), None);
    }

    #[test]
    fn idle_moves_emit_nothing() {
        let mut ui = TimelineInteraction::new(());
        assert_eq!(ui.pointer_move(300.0, TRACK, 100.0, None), None);
        ui.pointer_down_track(300.0, TRACK, 100.0);
        ui.pointer_up();
        assert_eq!(ui.state(), DragState::Idle);
        assert_eq!(ui.pointer_move(300.0, TRACK, 100.0, None), None);
    }

    #[test]
    fn listeners_do_not_accumulate_over_repeated_drags() {
        let mut ui = TimelineInteraction::new(CountingListeners::default());
        for _ in 0..5 {
            ui.pointer_down_track(200.0, TRACK, 10.0);
            ui.pointer_move(250.0, TRACK, 10.0, None);
            ui.pointer_up();
        }
        // Stray releases while idle are ignored.
        ui.pointer_up();
        let l = ui.listeners();
        assert!(!l.attached);
        assert_eq!(l.attach_calls, 5);
        assert_eq!(l.detach_calls, 5);
    }

    #[test]
    fn switching_target_mid_drag_keeps_single_subscription() {
        let mut ui = TimelineInteraction::new(CountingListeners::default());
        ui.pointer_down_track(200.0, TRACK, 10.0);
        ui.pointer_down_handle(TrimHandle::End);
        assert_eq!(ui.state(), DragState::Dragging(DragTarget::TrimEnd));
        assert_eq!(ui.listeners().attach_calls, 1);
        ui.pointer_up();
        assert_eq!(ui.listeners().detach_calls, 1);
    }

    #[test]
    fn dropping_mid_drag_detaches() {
        let detached = std::cell::Cell::new(false);
        {
            let mut ui = TimelineInteraction::new(DropProbe {
                detached: &detached,
            });
            ui.pointer_down_handle(TrimHandle::Start);
        }
        assert!(detached.get());
    }

    #[test]
    fn dropping_idle_does_not_detach() {
        let detached = std::cell::Cell::new(false);
        drop(TimelineInteraction::new(DropProbe {
            detached: &detached,
        }));
        assert!(!detached.get());
    }

    #[test]
    fn collapsed_track_maps_to_zero() {
        let track = TrackGeometry::new(10.0, 0.0);
        assert_eq!(track.time_at(50.0, 100.0), 0.0);
    }

    #[test]
    fn markers_every_five_seconds_under_a_minute() {
        let times: Vec<f64> = time_markers(45.0).iter().map(|m| m.time).collect();
        assert_eq!(
            times,
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0]
        );
    }

    #[test]
    fn markers_every_thirty_seconds_from_a_minute() {
        let markers = time_markers(90.0);
        let times: Vec<f64> = markers.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![0.0, 30.0, 60.0, 90.0]);
        assert_eq!(markers[1].label, "00:30");
        assert_eq!(markers[3].percent, 100.0);
    }

    #[test]
    fn markers_for_degenerate_durations() {
        assert_eq!(time_markers(0.0).len(), 1);
        assert!(time_markers(f64::NAN).is_empty());
        assert!(time_markers(-1.0).is_empty());
        assert_eq!(time_markers(59.0).last().unwrap().time, 55.0);
        assert_eq!(time_markers(60.0).last().unwrap().time, 60.0);
    }

    #[test]
    fn percentages_guard_zero_duration() {
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
        assert_eq!(progress_percent(5.0, 20.0), 25.0);
        assert_eq!(trim_percents(None, 20.0), (0.0, 100.0));
        assert_eq!(
            trim_percents(Some(TrimRange { start_time: 2.0, end_time: 10.0 }), 20.0),
            (10.0, 50.0)
        );
    }
}
