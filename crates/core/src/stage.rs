//! In-memory render surface.
//!
//! `Stage` plays the part a DOM container plays in a browser: it owns the
//! attached bullet elements, runs their travel animations against a
//! [`Clock`], honours the surface-wide play state and delay, and turns the
//! current state into a list of [`RenderCommand`]s for any renderer.

use barrage_protocol::{
    ElementId, ParamTarget, PlayState, Point, Rect, RenderCommand, SharedStr, StyleParam,
    TextAlign, ThemeToken, Viewport,
};
use unicode_width::UnicodeWidthStr;

use crate::clock::Clock;
use crate::surface::{BulletElement, RenderSurface, SurfaceHost};

const DEFAULT_GLYPH_WIDTH: f64 = 8.0;
const DEFAULT_LINE_HEIGHT: f64 = 16.0;
const WRAP_GROUP_ID: &str = "bullet-wrap";

#[derive(Debug, Clone)]
struct StageElement {
    id: ElementId,
    text: SharedStr,
    style_tag: Option<SharedStr>,
    top_percent: f64,
    touch_stop: bool,
    width: f64,
    duration_ms: Option<f64>,
    /// Animation time accumulated while running and not held, delay included.
    active_ms: f64,
    held: bool,
    done: bool,
}

#[derive(Debug, Clone)]
pub struct Stage<C: Clock> {
    clock: C,
    width: f64,
    height: f64,
    glyph_width: f64,
    line_height: f64,
    visible: bool,
    play_state: PlayState,
    delay_ms: f64,
    elements: Vec<StageElement>,
    completed: Vec<ElementId>,
    next_id: u64,
    last_sync_ms: f64,
}

impl<C: Clock> Stage<C> {
    pub fn new(clock: C, width: f64, height: f64) -> Self {
        let last_sync_ms = clock.now_ms();
        Self {
            clock,
            width,
            height,
            glyph_width: DEFAULT_GLYPH_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
            visible: true,
            play_state: PlayState::Running,
            delay_ms: 0.0,
            elements: Vec::new(),
            completed: Vec::new(),
            next_id: 0,
            last_sync_ms,
        }
    }

    /// Width of one terminal cell of text, and the height of a text line.
    pub fn with_glyph_size(mut self, glyph_width: f64, line_height: f64) -> Self {
        self.glyph_width = glyph_width;
        self.line_height = line_height;
        self
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.sync();
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Number of attached elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Travel duration set on an element, if any.
    pub fn duration_ms(&self, id: ElementId) -> Option<f64> {
        self.element(id).and_then(|e| e.duration_ms)
    }

    /// Measured width of `text` in surface units.
    pub fn measure(&self, text: &str) -> f64 {
        text.width() as f64 * self.glyph_width
    }

    /// Current top-left corner of an element in surface coordinates.
    pub fn position(&mut self, id: ElementId) -> Option<Point> {
        self.sync();
        self.element(id).map(|e| self.element_origin(e))
    }

    /// Freeze every touch-stop element under `point` (viewport coordinates).
    /// Returns how many elements were newly held.
    pub fn hold_at(&mut self, viewport: &Viewport, point: Point) -> usize {
        self.sync();
        let hits: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|e| e.touch_stop && !e.held)
            .filter(|e| self.element_rect(e, viewport).contains(point))
            .map(|e| e.id)
            .collect();
        for e in &mut self.elements {
            if hits.contains(&e.id) {
                e.held = true;
            }
        }
        hits.len()
    }

    /// Let every held element continue travelling.
    pub fn release_all(&mut self) {
        self.sync();
        for e in &mut self.elements {
            e.held = false;
        }
    }

    /// Render the current frame into `viewport`. Hidden stages render nothing.
    pub fn render(&mut self, viewport: &Viewport) -> Vec<RenderCommand> {
        self.sync();
        if !self.visible {
            return Vec::new();
        }

        let bounds = Rect::new(viewport.x, viewport.y, viewport.width, viewport.height);
        let mut commands = Vec::with_capacity(self.elements.len() + 4);
        commands.push(RenderCommand::BeginGroup {
            id: SharedStr::from(WRAP_GROUP_ID),
            label: None,
        });
        commands.push(RenderCommand::SetClip { rect: bounds });

        let font_size = self.line_height * self.scale_y(viewport);
        for e in &self.elements {
            let rect = self.element_rect(e, viewport);
            let color = if e.held {
                ThemeToken::BulletHeld
            } else {
                ThemeToken::for_style_tag(e.style_tag.as_deref())
            };
            commands.push(RenderCommand::DrawText {
                position: Point::new(rect.x, rect.y),
                text: e.text.clone(),
                color,
                font_size,
                align: TextAlign::Left,
                style_tag: e.style_tag.clone(),
                element_id: Some(e.id.0),
            });
        }

        commands.push(RenderCommand::ClearClip);
        commands.push(RenderCommand::EndGroup);
        commands
    }

    fn element(&self, id: ElementId) -> Option<&StageElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn progress(&self, e: &StageElement) -> f64 {
        match e.duration_ms {
            Some(d) if d > 0.0 => ((e.active_ms - self.delay_ms) / d).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    fn element_origin(&self, e: &StageElement) -> Point {
        let x = self.width - self.progress(e) * (self.width + e.width);
        let y = e.top_percent / 100.0 * self.height;
        Point::new(x, y)
    }

    fn scale_y(&self, viewport: &Viewport) -> f64 {
        if self.height > 0.0 {
            viewport.height / self.height
        } else {
            1.0
        }
    }

    fn element_rect(&self, e: &StageElement, viewport: &Viewport) -> Rect {
        let sx = if self.width > 0.0 {
            viewport.width / self.width
        } else {
            1.0
        };
        let sy = self.scale_y(viewport);
        let origin = self.element_origin(e);
        Rect::new(
            viewport.x + origin.x * sx,
            viewport.y + origin.y * sy,
            e.width * sx,
            self.line_height * sy,
        )
    }

    /// Advance animations to the clock's current reading.
    fn sync(&mut self) {
        let now = self.clock.now_ms();
        let dt = (now - self.last_sync_ms).max(0.0);
        self.last_sync_ms = now;
        if self.play_state == PlayState::Paused {
            return;
        }

        let delay = self.delay_ms;
        for e in &mut self.elements {
            if e.held || e.done {
                continue;
            }
            e.active_ms += dt;
            if let Some(d) = e.duration_ms
                && e.active_ms - delay >= d
            {
                e.done = true;
                self.completed.push(e.id);
            }
        }
    }
}

impl<C: Clock> RenderSurface for Stage<C> {
    fn append(&mut self, element: BulletElement) -> ElementId {
        self.sync();
        self.next_id += 1;
        let id = ElementId(self.next_id);
        let width = self.measure(&element.text);
        self.elements.push(StageElement {
            id,
            text: element.text,
            style_tag: element.style_tag,
            top_percent: element.top_percent,
            touch_stop: element.touch_stop,
            width,
            duration_ms: None,
            active_ms: 0.0,
            held: false,
            done: false,
        });
        id
    }

    fn remove(&mut self, id: ElementId) -> bool {
        self.sync();
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        self.completed.retain(|c| *c != id);
        before != self.elements.len()
    }

    fn element_width(&self, id: ElementId) -> Option<f64> {
        self.element(id).map(|e| e.width)
    }

    fn content_width(&self) -> f64 {
        self.width
    }

    fn set_param(&mut self, target: ParamTarget, param: StyleParam) {
        self.sync();
        match (target, param) {
            (ParamTarget::Element(id), StyleParam::PlayDuration(ms)) => {
                if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
                    e.duration_ms = Some(ms);
                }
            }
            (ParamTarget::Container, StyleParam::PlayDelay(ms)) => self.delay_ms = ms,
            (ParamTarget::Container, StyleParam::PlayState(state)) => self.play_state = state,
            // Per-element delay/state overrides are not supported.
            _ => {}
        }
    }

    fn take_completed(&mut self) -> Vec<ElementId> {
        self.sync();
        std::mem::take(&mut self.completed)
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Resolves container selectors to stages registered up front.
#[derive(Debug, Clone)]
pub struct StageHost<C: Clock + Clone> {
    clock: C,
    containers: Vec<(String, f64, f64)>,
    glyph_width: f64,
    line_height: f64,
}

impl<C: Clock + Clone> StageHost<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            containers: Vec::new(),
            glyph_width: DEFAULT_GLYPH_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    pub fn with_container(mut self, selector: impl Into<String>, width: f64, height: f64) -> Self {
        self.containers.push((selector.into(), width, height));
        self
    }

    pub fn with_glyph_size(mut self, glyph_width: f64, line_height: f64) -> Self {
        self.glyph_width = glyph_width;
        self.line_height = line_height;
        self
    }
}

impl<C: Clock + Clone> SurfaceHost for StageHost<C> {
    type Surface = Stage<C>;

    fn resolve(&mut self, container: &str) -> Option<Stage<C>> {
        let (_, width, height) = self.containers.iter().find(|(s, ..)| s == container)?;
        Some(
            Stage::new(self.clock.clone(), *width, *height)
                .with_glyph_size(self.glyph_width, self.line_height),
        )
    }
}
