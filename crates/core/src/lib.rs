//! Lane scheduling for scrolling bullet comments.
//!
//! A [`Director`] owns a shared comment queue and a fixed set of [`Lane`]s.
//! Each lane emits one comment at a time onto a [`RenderSurface`] and waits
//! until the comment's tail has entered the lane before claiming the next.
//! Timers are explicit deadlines fired by [`Director::tick`].

pub mod clock;
pub mod config;
pub mod director;
pub mod error;
pub mod lane;
pub mod queue;
pub mod stage;
pub mod surface;
pub mod svg;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::OverlayOptions;
pub use director::Director;
pub use error::ConfigurationError;
pub use lane::{Emission, Lane, LaneStats};
pub use queue::CommentQueue;
pub use stage::{Stage, StageHost};
pub use surface::{BulletElement, RenderSurface, SurfaceHost};
