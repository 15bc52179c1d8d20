use serde::{Deserialize, Serialize};

/// Handle for an element attached to a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Surface-wide animation play state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Running,
    Paused,
}

/// Where a style parameter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamTarget {
    /// The overlay wrap; inherited by every element.
    Container,
    Element(ElementId),
}

/// Typed custom style parameters understood by render surfaces.
///
/// These correspond to the `--playDuration`, `--playDelay` and `--playState`
/// custom properties a DOM surface would set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StyleParam {
    /// Travel animation length in milliseconds.
    PlayDuration(f64),
    /// Delay before an element starts travelling, in milliseconds.
    PlayDelay(f64),
    PlayState(PlayState),
}
