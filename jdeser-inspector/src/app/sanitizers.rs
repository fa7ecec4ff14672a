use std::borrow::Cow;

/// Escapes control characters so decoded strings cannot rewrite the terminal.
pub fn sanitize_control(input: &str) -> Cow<str> {
    for (idx, c) in input.char_indices() {
        if c.is_control() || c == '"' || c == '\\' {
            let mut res = String::from(&input[..idx]);
            input[idx..].chars().for_each(|c| match c {
                '\n' => res.push_str("\\n"),
                '\r' => res.push_str("\\r"),
                '\t' => res.push_str("\\t"),
                '"' => res.push_str("\\\""),
                '\\' => res.push_str("\\\\"),
                c if c.is_control() => res.push_str(&format!("\\u{{{:04x}}}", u32::from(c))),
                _ => res.push(c),
            });
            return Cow::Owned(res);
        }
    }
    Cow::Borrowed(input)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use crate::app::sanitizers::sanitize_control;

    #[test]
    fn doesnt_sanitize_empty_string() {
        assert_eq!(&sanitize_control(""), "");
    }

    #[test]
    fn doesnt_sanitize_plain_text() {
        assert!(matches!(sanitize_control("Hello wörld"), Cow::Borrowed(_)));
    }

    #[test]
    fn can_sanitize_whitespace() {
        assert_eq!(&sanitize_control("a\nb\tc\r"), "a\\nb\\tc\\r");
    }

    #[test]
    fn can_sanitize_escape_sequence() {
        assert_eq!(&sanitize_control("\u{1b}[2J"), "\\u{001b}[2J");
        assert_eq!(&sanitize_control("nul\u{0}"), "nul\\u{0000}");
    }

    #[test]
    fn can_sanitize_quotes() {
        assert_eq!(&sanitize_control("say \"hi\" \\"), "say \\\"hi\\\" \\\\");
    }
}
