//! Text helpers shared by the containers.

/// Replace `&`, `<` and `>` with their HTML entities. Applied to text
/// content at insertion time when a caller asks for escaping; stored
/// text is otherwise kept verbatim.
pub fn escape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Trim and lowercase a name (attribute names, meta names, rel values).
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_entities() {
        assert_eq!(escape_entities("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_entities("plain"), "plain");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Viewport "), "viewport");
        assert_eq!(normalize_name("CHARSET"), "charset");
    }
}
