use barrage_protocol::{ElementId, ParamTarget, SharedStr, StyleParam};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::OverlayOptions;
use crate::queue::CommentQueue;
use crate::surface::{BulletElement, RenderSurface};

/// Timing metadata of the comment a lane emitted last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub started_at_ms: f64,
    pub text: SharedStr,
}

/// Per-lane instrumentation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneStats {
    pub emitted: u64,
    pub timers_armed: u64,
    pub timers_cancelled: u64,
    pub timers_fired: u64,
}

/// One horizontal track.
///
/// A lane emits at most one comment at a time and holds at most one pending
/// timer, stored as an absolute deadline. The owner fires the timer by
/// calling [`Lane::fire_timer`] once the deadline has passed.
#[derive(Debug, Clone)]
pub struct Lane {
    index: usize,
    top_percent: f64,
    speed: f64,
    safety_margin_ms: f64,
    touch_stop: bool,

    free: bool,
    paused: bool,
    pending_timer: Option<f64>,
    wait_duration_ms: f64,
    paused_at_ms: Option<f64>,
    current_emission: Option<Emission>,
    stats: LaneStats,
}

impl Lane {
    /// Create lane `index` (1-based) using the overlay's timing options.
    pub fn new(index: usize, options: &OverlayOptions) -> Self {
        Self {
            index,
            top_percent: options.lane_top_percent(index),
            speed: options.speed,
            safety_margin_ms: options.safety_margin_ms,
            touch_stop: options.touch_stop,
            free: true,
            paused: false,
            pending_timer: None,
            wait_duration_ms: 0.0,
            paused_at_ms: None,
            current_emission: None,
            stats: LaneStats::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn top_percent(&self) -> f64 {
        self.top_percent
    }

    pub fn is_free(&self) -> bool {
        self.free
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Deadline of the pending timer, if one is armed.
    pub fn deadline(&self) -> Option<f64> {
        self.pending_timer
    }

    /// Time until the tail of the last emitted comment entered the lane.
    pub fn wait_duration_ms(&self) -> f64 {
        self.wait_duration_ms
    }

    pub fn paused_at_ms(&self) -> Option<f64> {
        self.paused_at_ms
    }

    pub fn current_emission(&self) -> Option<&Emission> {
        self.current_emission.as_ref()
    }

    pub fn stats(&self) -> LaneStats {
        self.stats
    }

    /// Freeze the lane, cancelling its pending timer. No-op when paused.
    pub fn pause(&mut self, now_ms: f64) {
        if self.paused {
            return;
        }
        self.paused_at_ms = Some(now_ms);
        self.paused = true;
        self.cancel_timer();
    }

    /// Resume a paused lane. No-op when running.
    ///
    /// The timer is re-armed for the unelapsed part of the last wait:
    /// `wait - (paused_at - started_at)`, clamped at zero.
    pub fn start(&mut self, now_ms: f64) {
        if !self.paused {
            return;
        }
        self.paused = false;

        let remaining = self.remaining_wait_ms();
        self.arm_timer(now_ms + remaining);
    }

    /// Unelapsed wait at the moment the lane was paused.
    pub fn remaining_wait_ms(&self) -> f64 {
        let (Some(paused_at), Some(emission)) = (self.paused_at_ms, &self.current_emission) else {
            return 0.0;
        };
        (self.wait_duration_ms - (paused_at - emission.started_at_ms)).max(0.0)
    }

    /// Claim the queue head and emit it onto `surface`.
    ///
    /// Does nothing when paused, busy, or when the queue is empty. Returns the
    /// attached element on success.
    pub fn attempt_emit<S: RenderSurface>(
        &mut self,
        now_ms: f64,
        queue: &mut CommentQueue,
        surface: &mut S,
    ) -> Option<ElementId> {
        if self.paused || !self.free {
            return None;
        }
        let comment = queue.claim()?;

        self.free = false;
        let id = surface.append(BulletElement {
            text: comment.text.clone(),
            style_tag: comment.style_tag,
            top_percent: self.top_percent,
            touch_stop: self.touch_stop,
        });

        // Width is only known once the element is attached.
        let element_width = surface.element_width(id).unwrap_or(0.0);
        let travel_distance = surface.content_width() + element_width;
        let travel_duration_ms = travel_distance / self.speed;
        self.wait_duration_ms = element_width / self.speed;

        debug!(
            lane = self.index,
            text = %comment.text,
            element_width,
            travel_duration_ms,
            wait_duration_ms = self.wait_duration_ms,
            "emitted comment"
        );

        self.current_emission = Some(Emission {
            started_at_ms: now_ms,
            text: comment.text,
        });
        surface.set_param(
            ParamTarget::Element(id),
            StyleParam::PlayDuration(travel_duration_ms),
        );
        self.stats.emitted += 1;
        self.arm_timer(now_ms + self.wait_duration_ms + self.safety_margin_ms);
        Some(id)
    }

    /// Fire the pending timer at `now_ms`: the lane becomes free and tries
    /// to emit the next comment. Returns `false` if no timer was pending.
    pub fn fire_timer<S: RenderSurface>(
        &mut self,
        now_ms: f64,
        queue: &mut CommentQueue,
        surface: &mut S,
    ) -> bool {
        if self.pending_timer.take().is_none() {
            return false;
        }
        trace!(lane = self.index, now_ms, "timer fired");
        self.stats.timers_fired += 1;
        self.free = true;
        self.attempt_emit(now_ms, queue, surface);
        true
    }

    fn arm_timer(&mut self, deadline_ms: f64) {
        // A lane holds one timer; arming again replaces the old one.
        if self.pending_timer.replace(deadline_ms).is_some() {
            self.stats.timers_cancelled += 1;
        }
        self.stats.timers_armed += 1;
        trace!(lane = self.index, deadline_ms, "timer armed");
    }

    fn cancel_timer(&mut self) {
        if let Some(deadline_ms) = self.pending_timer.take() {
            self.stats.timers_cancelled += 1;
            trace!(lane = self.index, deadline_ms, "timer cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_protocol::Comment;

    /// Surface with a fixed content width where every element is
    /// `10 * chars` wide.
    #[derive(Default)]
    struct FixedSurface {
        width: f64,
        attached: Vec<(ElementId, f64)>,
        params: Vec<(ParamTarget, StyleParam)>,
        next_id: u64,
    }

    impl RenderSurface for FixedSurface {
        fn append(&mut self, element: BulletElement) -> ElementId {
            self.next_id += 1;
            let id = ElementId(self.next_id);
            let width = element.text.chars().count() as f64 * 10.0;
            self.attached.push((id, width));
            id
        }

        fn remove(&mut self, id: ElementId) -> bool {
            let before = self.attached.len();
            self.attached.retain(|(e, _)| *e != id);
            before != self.attached.len()
        }

        fn element_width(&self, id: ElementId) -> Option<f64> {
            self.attached.iter().find(|(e, _)| *e == id).map(|(_, w)| *w)
        }

        fn content_width(&self) -> f64 {
            self.width
        }

        fn set_param(&mut self, target: ParamTarget, param: StyleParam) {
            self.params.push((target, param));
        }

        fn take_completed(&mut self) -> Vec<ElementId> {
            Vec::new()
        }

        fn set_visible(&mut self, _visible: bool) {}
    }

    fn setup() -> (Lane, CommentQueue, FixedSurface) {
        let lane = Lane::new(1, &OverlayOptions::new("#x"));
        let surface = FixedSurface {
            width: 500.0,
            ..Default::default()
        };
        (lane, CommentQueue::new(), surface)
    }

    #[test]
    fn emits_and_schedules_next_attempt() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["0123456789"]); // 100 px wide

        let id = lane.attempt_emit(0.0, &mut queue, &mut surface);
        assert!(id.is_some());
        assert!(!lane.is_free());
        assert!((lane.wait_duration_ms() - 1250.0).abs() < 1e-9);
        assert_eq!(lane.deadline(), Some(1350.0));
        assert_eq!(
            surface.params,
            vec![(
                ParamTarget::Element(ElementId(1)),
                StyleParam::PlayDuration(7500.0)
            )]
        );
        assert_eq!(
            lane.current_emission().map(|e| e.text.as_str()),
            Some("0123456789")
        );
    }

    #[test]
    fn empty_queue_leaves_lane_untouched() {
        let (mut lane, mut queue, mut surface) = setup();
        assert!(lane.attempt_emit(0.0, &mut queue, &mut surface).is_none());
        assert!(lane.is_free());
        assert!(lane.deadline().is_none());
        assert!(lane.current_emission().is_none());
        assert_eq!(lane.stats(), LaneStats::default());
    }

    #[test]
    fn busy_lane_ignores_attempts() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["a", "b"]);
        lane.attempt_emit(0.0, &mut queue, &mut surface);
        assert!(lane.attempt_emit(10.0, &mut queue, &mut surface).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn timer_frees_lane_and_pulls_next() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["aa", "bbb"]);
        lane.attempt_emit(0.0, &mut queue, &mut surface);
        let deadline = lane.deadline().unwrap_or_default();

        assert!(lane.fire_timer(deadline, &mut queue, &mut surface));
        assert_eq!(lane.current_emission().map(|e| e.started_at_ms), Some(deadline));
        assert_eq!(lane.current_emission().map(|e| e.text.as_str()), Some("bbb"));

        let next = lane.deadline().unwrap_or_default();
        assert!(lane.fire_timer(next, &mut queue, &mut surface));
        assert!(lane.is_free());
        assert!(lane.deadline().is_none());
        assert!(!lane.fire_timer(next, &mut queue, &mut surface));
    }

    #[test]
    fn pause_cancels_and_start_resumes_remaining_wait() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["0123456789"]);
        lane.attempt_emit(1000.0, &mut queue, &mut surface);

        lane.pause(1400.0);
        assert!(lane.is_paused());
        assert!(lane.deadline().is_none());

        // 400 ms of the 1250 ms wait elapsed before the pause.
        assert_eq!(lane.remaining_wait_ms(), 850.0);
        lane.start(5000.0);
        assert!(!lane.is_paused());
        assert_eq!(lane.deadline(), Some(5000.0 + 850.0));
    }

    #[test]
    fn pause_and_start_are_idempotent() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["0123456789"]);
        lane.attempt_emit(0.0, &mut queue, &mut surface);

        lane.pause(100.0);
        lane.pause(900.0);
        assert_eq!(lane.paused_at_ms(), Some(100.0));

        lane.start(200.0);
        let deadline = lane.deadline();
        lane.start(700.0);
        assert_eq!(lane.deadline(), deadline);
        assert_eq!(lane.stats().timers_armed, 2);
    }

    #[test]
    fn paused_lane_does_not_emit() {
        let (mut lane, mut queue, mut surface) = setup();
        queue.push_all(["a"]);
        lane.pause(0.0);
        assert!(lane.attempt_emit(0.0, &mut queue, &mut surface).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn start_before_any_emission_retries_immediately() {
        let (mut lane, mut queue, mut surface) = setup();
        lane.pause(50.0);
        queue.push_all([Comment::new("late")]);
        lane.start(80.0);
        assert_eq!(lane.deadline(), Some(80.0));
        assert!(lane.fire_timer(80.0, &mut queue, &mut surface));
        assert!(!lane.is_free());
    }
}
