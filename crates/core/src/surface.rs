use barrage_protocol::{ElementId, ParamTarget, SharedStr, StyleParam};

/// What a lane asks the surface to attach for one emitted comment.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletElement {
    pub text: SharedStr,
    pub style_tag: Option<SharedStr>,
    /// Top edge as a percentage of surface height.
    pub top_percent: f64,
    /// Interaction may freeze this element's travel.
    pub touch_stop: bool,
}

/// The visual surface bullets travel across.
///
/// The lane scheduler never keeps an element after emission; the surface
/// owns it until its travel animation completes and the director removes it.
pub trait RenderSurface {
    /// Attach a new element. Its width is known once this returns.
    fn append(&mut self, element: BulletElement) -> ElementId;

    /// Detach an element. Returns `false` if it was not attached.
    fn remove(&mut self, id: ElementId) -> bool;

    /// Rendered width of an attached element.
    fn element_width(&self, id: ElementId) -> Option<f64>;

    /// Width of the surface's content box.
    fn content_width(&self) -> f64;

    fn set_param(&mut self, target: ParamTarget, param: StyleParam);

    /// Elements whose travel animation finished since the last call.
    fn take_completed(&mut self) -> Vec<ElementId>;

    fn set_visible(&mut self, visible: bool);
}

/// Resolves a container selector into a surface at construction time.
pub trait SurfaceHost {
    type Surface: RenderSurface;

    fn resolve(&mut self, container: &str) -> Option<Self::Surface>;
}

impl<S, F> SurfaceHost for F
where
    S: RenderSurface,
    F: FnMut(&str) -> Option<S>,
{
    type Surface = S;

    fn resolve(&mut self, container: &str) -> Option<S> {
        self(container)
    }
}
