use barrage_protocol::{Comment, ParamTarget, PlayState, StyleParam};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::OverlayOptions;
use crate::error::ConfigurationError;
use crate::lane::Lane;
use crate::queue::CommentQueue;
use crate::surface::{RenderSurface, SurfaceHost};

/// Owns the shared comment queue, a fixed set of lanes and the play state.
///
/// All work happens on the caller's thread. Lane timers are deadlines;
/// the owner of the event loop calls [`Director::tick`] to fire the due ones
/// and may sleep until [`Director::next_deadline`] in between.
#[derive(Debug)]
pub struct Director<S: RenderSurface, C: Clock = SystemClock> {
    options: OverlayOptions,
    surface: S,
    clock: C,
    queue: CommentQueue,
    lanes: Vec<Lane>,
    playing: bool,
    visible: bool,
}

impl<S: RenderSurface, C: Clock> Director<S, C> {
    /// Validate `options`, resolve the container through `host` and create
    /// `options.lane_count` lanes.
    pub fn new<H>(
        host: &mut H,
        options: OverlayOptions,
        clock: C,
    ) -> Result<Self, ConfigurationError>
    where
        H: SurfaceHost<Surface = S>,
    {
        options.validate()?;
        let mut surface = host
            .resolve(&options.container)
            .ok_or_else(|| ConfigurationError::ContainerNotFound(options.container.clone()))?;

        if let Some(delay) = options.delay {
            surface.set_param(ParamTarget::Container, StyleParam::PlayDelay(delay));
        }

        let lanes = (1..=options.lane_count)
            .map(|index| Lane::new(index, &options))
            .collect();

        info!(
            container = %options.container,
            lanes = options.lane_count,
            speed = options.speed,
            "overlay created"
        );

        Ok(Self {
            options,
            surface,
            clock,
            queue: CommentQueue::new(),
            lanes,
            playing: true,
            visible: true,
        })
    }

    /// Queue comments in order and wake every lane.
    pub fn push_comments<I>(&mut self, comments: I)
    where
        I: IntoIterator,
        I::Item: Into<Comment>,
    {
        self.tick();
        self.queue.push_all(comments);
        debug!(queued = self.queue.len(), "comments pushed");

        let now = self.clock.now_ms();
        for lane in &mut self.lanes {
            lane.attempt_emit(now, &mut self.queue, &mut self.surface);
        }
    }

    /// Pause every lane and the surface animation.
    pub fn pause(&mut self) {
        self.tick();
        let now = self.clock.now_ms();
        self.surface.set_param(
            ParamTarget::Container,
            StyleParam::PlayState(PlayState::Paused),
        );
        for lane in &mut self.lanes {
            lane.pause(now);
        }
        self.playing = false;
        debug!(now, "paused");
    }

    /// Resume every paused lane and the surface animation.
    pub fn start(&mut self) {
        self.tick();
        let now = self.clock.now_ms();
        self.surface.set_param(
            ParamTarget::Container,
            StyleParam::PlayState(PlayState::Running),
        );
        for lane in &mut self.lanes {
            lane.start(now);
        }
        self.playing = true;
        debug!(now, "started");
    }

    pub fn show(&mut self) {
        self.surface.set_visible(true);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.surface.set_visible(false);
        self.visible = false;
    }

    /// Fire every lane timer whose deadline has passed, earliest first, and
    /// remove elements that finished travelling. Returns the number of timers
    /// fired.
    ///
    /// A due timer fires at the tick's own time, and each lane fires at most
    /// once per tick. After a stalled loop a lane therefore emits one comment
    /// now and schedules the next from the moment that element attached, so
    /// elements in one lane never start on top of each other.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now_ms();
        let due = self.due_lanes(now);
        for &index in &due {
            self.lanes[index].fire_timer(now, &mut self.queue, &mut self.surface);
        }

        for id in self.surface.take_completed() {
            self.surface.remove(id);
        }
        due.len()
    }

    /// Earliest pending lane deadline.
    pub fn next_deadline(&self) -> Option<f64> {
        self.lanes
            .iter()
            .filter_map(Lane::deadline)
            .min_by(f64::total_cmp)
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn queue(&self) -> &CommentQueue {
        &self.queue
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Lanes whose deadline is at or before `now`, earliest deadline first;
    /// ties go to the lower lane index.
    fn due_lanes(&self, now: f64) -> Vec<usize> {
        let mut due: Vec<(usize, f64)> = self
            .lanes
            .iter()
            .enumerate()
            .filter_map(|(i, lane)| lane.deadline().map(|d| (i, d)))
            .filter(|(_, d)| *d <= now)
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        due.into_iter().map(|(i, _)| i).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::stage::{Stage, StageHost};

    fn director(lanes: usize) -> (ManualClock, Director<Stage<ManualClock>, ManualClock>) {
        let clock = ManualClock::new(0.0);
        let mut host = StageHost::new(clock.clone())
            .with_container("#player", 500.0, 300.0)
            .with_glyph_size(20.0, 20.0);
        let mut options = OverlayOptions::new("#player");
        options.lane_count = lanes;
        let director = Director::new(&mut host, options, clock.clone());
        match director {
            Ok(d) => (clock, d),
            Err(e) => unreachable!("valid setup rejected: {e}"),
        }
    }

    #[test]
    fn creates_fixed_lane_set() {
        let (_, d) = director(3);
        let indices: Vec<_> = d.lanes().iter().map(Lane::index).collect();
        assert_eq!(indices, [1, 2, 3]);
        assert!(d.is_playing());
        assert!(d.next_deadline().is_none());
    }

    #[test]
    fn rejects_unknown_container() {
        let clock = ManualClock::new(0.0);
        let mut host = StageHost::new(clock.clone()).with_container("#player", 500.0, 300.0);
        let result = Director::new(&mut host, OverlayOptions::new("#nope"), clock);
        assert!(matches!(
            result,
            Err(ConfigurationError::ContainerNotFound(ref s)) if s == "#nope"
        ));
    }

    #[test]
    fn delay_option_reaches_surface() {
        let clock = ManualClock::new(0.0);
        let mut host = StageHost::new(clock.clone()).with_container("#player", 500.0, 300.0);
        let mut options = OverlayOptions::new("#player");
        options.delay = Some(250.0);
        let d = Director::new(&mut host, options, clock);
        assert_eq!(d.map(|d| d.surface().delay_ms()).ok(), Some(250.0));
    }

    #[test]
    fn tick_fires_due_timers_in_deadline_order() {
        let (clock, mut d) = director(2);
        d.push_comments(["hello", "hi", "next"]);
        // Lane 1: 100 px -> 1350 ms. Lane 2: 40 px -> 600 ms.
        assert_eq!(d.next_deadline(), Some(600.0));

        clock.set(599.0);
        assert_eq!(d.tick(), 0);
        clock.set(600.0);
        assert_eq!(d.tick(), 1);
        assert!(d.queue().is_empty());
        let lane2 = &d.lanes()[1];
        assert_eq!(lane2.current_emission().map(|e| e.text.as_str()), Some("next"));
        assert_eq!(lane2.current_emission().map(|e| e.started_at_ms), Some(600.0));
    }

    #[test]
    fn finished_elements_are_removed() {
        let (clock, mut d) = director(1);
        d.push_comments(["hello"]);
        assert_eq!(d.surface().len(), 1);
        // Travel: (500 + 100) / 0.08 = 7500 ms.
        clock.set(7499.0);
        d.tick();
        assert_eq!(d.surface().len(), 1);
        clock.set(7500.0);
        d.tick();
        assert!(d.surface().is_empty());
    }

    #[test]
    fn pause_flushes_due_timers_first() {
        let (clock, mut d) = director(1);
        d.push_comments(["hello", "world"]);
        clock.set(2000.0);
        d.pause();
        // The 1350 ms timer fired before pausing and emitted "world".
        assert_eq!(d.queue().len(), 0);
        assert_eq!(
            d.lanes()[0].current_emission().map(|e| e.text.as_str()),
            Some("world")
        );
        assert!(!d.is_playing());
        assert_eq!(d.surface().play_state(), PlayState::Paused);
    }

    #[test]
    fn show_and_hide_toggle_visibility() {
        let (_, mut d) = director(1);
        d.hide();
        assert!(!d.is_visible());
        assert!(!d.surface().is_visible());
        d.show();
        assert!(d.surface().is_visible());
    }
}
