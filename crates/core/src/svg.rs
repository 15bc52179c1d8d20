//! SVG snapshot: converts one frame of `RenderCommand`s into a standalone
//! SVG document.

use barrage_protocol::{RenderCommand, ThemeToken};

/// Render a frame as an SVG document string.
///
/// `width` and `height` define the viewBox; `dark` selects the palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    ));
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::OverlayBackground, dark),
    ));

    let mut clip_count = 0;
    let mut open_clips = 0;
    for cmd in commands {
        match cmd {
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                style_tag,
                ..
            } => {
                let fill = resolve_color(*color, dark);
                let class = style_tag
                    .as_ref()
                    .map(|t| format!(r#" class="bullet {}""#, escape_xml(t)))
                    .unwrap_or_else(|| r#" class="bullet""#.to_string());
                // Text is positioned by its top edge; SVG places the baseline.
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" font-size="{font_size}" fill="{fill}" dominant-baseline="hanging"{class}>{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
            }
            RenderCommand::SetClip { rect } => {
                clip_count += 1;
                svg.push_str(&format!(
                    r#"<clipPath id="clip{clip_count}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clip_count})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
                open_clips += 1;
            }
            RenderCommand::ClearClip => {
                if open_clips > 0 {
                    svg.push_str("</g>");
                    open_clips -= 1;
                }
            }
            RenderCommand::BeginGroup { id, .. } => {
                svg.push_str(&format!(r#"<g class="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }
    for _ in 0..open_clips {
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::BulletText | ThemeToken::HeaderText => "#ececec",
            ThemeToken::BulletAccent => "#ffd600",
            ThemeToken::BulletMuted => "#9e9e9e",
            ThemeToken::BulletHeld => "#4caf50",
            ThemeToken::OverlayBackground => "#181818",
            ThemeToken::HeaderBackground => "#303030",
        }
    } else {
        match token {
            ThemeToken::BulletText | ThemeToken::HeaderText => "#1a1a2e",
            ThemeToken::BulletAccent => "#e67e22",
            ThemeToken::BulletMuted => "#666677",
            ThemeToken::BulletHeld => "#27ae60",
            ThemeToken::OverlayBackground => "#f8f9fa",
            ThemeToken::HeaderBackground => "#dee2e6",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_protocol::{Point, Rect, SharedStr, TextAlign};

    fn text(s: &str, style_tag: Option<&str>) -> RenderCommand {
        RenderCommand::DrawText {
            position: Point::new(40.0, 10.0),
            text: s.into(),
            color: ThemeToken::for_style_tag(style_tag),
            font_size: 16.0,
            align: TextAlign::Left,
            style_tag: style_tag.map(SharedStr::from),
            element_id: Some(1),
        }
    }

    #[test]
    fn wraps_frame_in_svg() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "bullet-wrap".into(),
                label: None,
            },
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 800.0, 400.0),
            },
            text("hello", Some("vip")),
            RenderCommand::ClearClip,
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 800.0, 400.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">hello</text>"));
        assert!(svg.contains(r#"class="bullet vip""#));
        assert!(svg.contains("#ffd600"));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn escapes_comment_text() {
        let svg = render_svg(&[text("<b>&'\"", None)], 100.0, 100.0, false);
        assert!(svg.contains("&lt;b&gt;&amp;&apos;&quot;"));
    }

    #[test]
    fn closes_unbalanced_clip() {
        let commands = vec![RenderCommand::SetClip {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        }];
        let svg = render_svg(&commands, 10.0, 10.0, false);
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }
}
