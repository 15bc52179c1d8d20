use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// One bullet comment as queued by the caller.
///
/// Immutable once queued. `style_tag` is an opaque class name passed through
/// to the rendered element (`className` is accepted as an alias on input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: SharedStr,
    #[serde(default, alias = "className", skip_serializing_if = "Option::is_none")]
    pub style_tag: Option<SharedStr>,
}

impl Comment {
    pub fn new(text: impl Into<SharedStr>) -> Self {
        Self {
            text: text.into(),
            style_tag: None,
        }
    }

    pub fn with_style(text: impl Into<SharedStr>, style_tag: impl Into<SharedStr>) -> Self {
        Self {
            text: text.into(),
            style_tag: Some(style_tag.into()),
        }
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Comment::new(text)
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Comment::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_style_tag_and_class_name() {
        let a: Comment = serde_json::from_str(r#"{"text":"hi","styleTag":"vip"}"#)
            .unwrap_or_else(|_| Comment::new(""));
        assert_eq!(a, Comment::with_style("hi", "vip"));

        let b: Comment = serde_json::from_str(r#"{"text":"hi","className":"vip"}"#)
            .unwrap_or_else(|_| Comment::new(""));
        assert_eq!(b.style_tag.as_deref(), Some("vip"));
    }

    #[test]
    fn style_tag_is_optional() {
        let c: Comment =
            serde_json::from_str(r#"{"text":"plain"}"#).unwrap_or_else(|_| Comment::new(""));
        assert_eq!(c.text, "plain");
        assert!(c.style_tag.is_none());

        let json = serde_json::to_string(&c).unwrap_or_default();
        assert_eq!(json, r#"{"text":"plain"}"#);
    }
}
