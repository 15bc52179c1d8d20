use anyhow::{Context, Result, bail};
use barrage_protocol::Comment;

/// Parse a comment feed.
///
/// Accepts either a JSON array of comments (`[{"text": "...", "styleTag": "..."}]`,
/// bare strings allowed) or plain text with one comment per non-blank line.
/// Text that happens to be a JSON scalar (`42`, `true`, `null`) is read as
/// plain text.
pub fn parse_feed(data: &[u8]) -> Result<Vec<Comment>> {
    match serde_json::from_slice::<serde_json::Value>(data) {
        Ok(serde_json::Value::Array(items)) => return parse_items(&items),
        Ok(serde_json::Value::Object(_)) => bail!("JSON feed must be an array of comments"),
        _ => {}
    }

    let text = std::str::from_utf8(data).context("feed is neither JSON nor UTF-8 text")?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Comment::from)
        .collect())
}

fn parse_items(items: &[serde_json::Value]) -> Result<Vec<Comment>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::String(text) => Ok(Comment::new(text.as_str())),
            other => serde_json::from_value(other.clone())
                .with_context(|| format!("comment #{i} is malformed")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array_with_styles_and_bare_strings() {
        let feed = br#"[{"text":"first","styleTag":"vip"},"second",{"text":"third","className":"dim"}]"#;
        let comments = parse_feed(feed).unwrap_or_default();
        assert_eq!(
            comments,
            vec![
                Comment::with_style("first", "vip"),
                Comment::new("second"),
                Comment::with_style("third", "dim"),
            ]
        );
    }

    #[test]
    fn plain_text_lines() {
        let comments = parse_feed("hello\n\n  world  \n弹幕\n".as_bytes()).unwrap_or_default();
        let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["hello", "world", "弹幕"]);
    }

    #[test]
    fn json_scalars_are_plain_text() {
        for feed in ["42", "true\n", "null"] {
            let comments = parse_feed(feed.as_bytes()).unwrap_or_default();
            let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(texts, [feed.trim()]);
        }
    }

    #[test]
    fn rejects_non_array_json_and_malformed_items() {
        assert!(parse_feed(br#"{"text":"x"}"#).is_err());
        assert!(parse_feed(br#"[{"style":"x"}]"#).is_err());
        assert!(parse_feed(&[0xff, 0xfe, 0x00]).is_err());
    }
}
