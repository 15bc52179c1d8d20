use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Bullet text
    BulletText,
    BulletAccent,
    BulletMuted,
    BulletHeld,

    // Overlay wrap
    OverlayBackground,

    // Frontend chrome
    HeaderBackground,
    HeaderText,
}

impl ThemeToken {
    /// Pick the text token for a comment's style tag.
    ///
    /// Unknown tags fall back to [`ThemeToken::BulletText`]; renderers that
    /// understand the raw tag (e.g. a CSS class) can still read it from the
    /// render command.
    pub fn for_style_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("accent" | "highlight" | "vip") => ThemeToken::BulletAccent,
            Some("muted" | "dim") => ThemeToken::BulletMuted,
            _ => ThemeToken::BulletText,
        }
    }
}
