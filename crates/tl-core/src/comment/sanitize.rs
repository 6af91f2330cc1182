//! HTML special-character encoding for user supplied text

/// Encode `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// An `&` that already starts a well-formed entity (`&amp;`, `&#039;`,
/// `&#x27;`, ...) is kept as is, so encoding already encoded text is a
/// no-op.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for (pos, ch) in input.char_indices() {
        match ch {
            '&' if starts_entity(&input[pos..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }

    out
}

/// Check whether `s` (starting at an `&`) begins with a complete entity
fn starts_entity(s: &str) -> bool {
    let Some(body) = s.strip_prefix('&') else {
        return false;
    };
    let Some(end) = body.find(';') else {
        return false;
    };
    let name = &body[..end];

    if let Some(num) = name.strip_prefix('#') {
        return match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        };
    }

    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a \"quote\""), "a &quot;quote&quot;");
        assert_eq!(escape_html("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_html("First message"), "First message");
        assert_eq!(escape_html("naïve café ✓"), "naïve café ✓");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<b>bold</b> & 'quoted' \"text\"",
            "5 > 3 && 2 < 4",
            "&amp;&lt;&#039;&#x27;",
            "trailing &",
            "&;",
            "&#;",
            "&#xZZ;",
        ];
        for input in inputs {
            let once = escape_html(input);
            assert_eq!(escape_html(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_existing_entities_kept() {
        assert_eq!(escape_html("&amp; &copy; &#169; &#xA9;"), "&amp; &copy; &#169; &#xA9;");
    }

    #[test]
    fn test_malformed_entities_encoded() {
        assert_eq!(escape_html("&;"), "&amp;;");
        assert_eq!(escape_html("&#;"), "&amp;#;");
        assert_eq!(escape_html("& amp;"), "&amp; amp;");
        assert_eq!(escape_html("AT&T"), "AT&amp;T");
    }
}
