use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Immutable, cheaply clonable comment text.
///
/// A comment's text is cloned from the queue into the lane's emission record
/// and again into every frame's `DrawText`; `Arc<str>` keeps those clones to a
/// refcount bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SharedStr {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SharedStr {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::ops::Deref for SharedStr {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SharedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        SharedStr(Arc::from(s))
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        SharedStr(Arc::from(s))
    }
}

impl std::fmt::Display for SharedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Hand-rolled so serde's `rc` feature is not needed.
impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SharedStr::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_compare_equal() {
        let a = SharedStr::from("弹幕");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a, "弹幕");
    }

    #[test]
    fn decodes_escaped_json() {
        // Escapes force an owned string; a borrowed `&str` would fail here.
        let s: SharedStr =
            serde_json::from_str(r#""line\nbreak""#).unwrap_or_else(|_| SharedStr::from(""));
        assert_eq!(s, "line\nbreak");
        assert_eq!(serde_json::to_string(&s).unwrap_or_default(), r#""line\nbreak""#);
    }

    #[test]
    fn display_and_deref() {
        let s = SharedStr::from(format!("{}!", "hello"));
        assert_eq!(format!("{s}"), "hello!");
        assert_eq!(s.len(), 6);
    }
}
