pub mod commands;
pub mod comment;
pub mod shared_str;
pub mod style;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use comment::Comment;
pub use shared_str::SharedStr;
pub use style::{ElementId, ParamTarget, PlayState, StyleParam};
pub use theme::ThemeToken;
pub use types::{Point, Rect, Viewport};
