//! Character classes and string escaping for the three output syntaxes.

/// `PN_CHARS_BASE` from the Turtle grammar, which is also the XML
/// `NameStartChar` set minus `:` and `_`.
#[must_use]
pub fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(c,
            '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}')
}

/// `PN_CHARS` from the Turtle grammar (name characters other than `.` and `:`).
#[must_use]
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || c == '_'
        || c == '-'
        || c.is_ascii_digit()
        || matches!(c, '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Whether `local` can follow `prefix:` in Turtle without escapes.
#[must_use]
pub fn is_turtle_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(is_name_start_char(first) || first == '_' || first == ':' || first.is_ascii_digit()) {
        return false;
    }
    if local.ends_with('.') {
        return false;
    }
    chars.all(|c| is_name_char(c) || c == '.' || c == ':')
}

/// Whether `local` is an XML `NCName`, usable as the local part of an
/// element name.
#[must_use]
pub fn is_xml_ncname(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (is_name_start_char(first) || first == '_') && chars.all(|c| is_name_char(c) || c == '.')
}

/// Whether `s` contains a line or page break.
#[must_use]
pub fn is_multiline(s: &str) -> bool {
    s.contains(['\n', '\u{B}', '\u{C}', '\r'])
}

/// Quotes `s` as a Turtle string, choosing the quote style that needs the
/// fewest escapes and the long form when `s` spans lines.
#[must_use]
pub fn turtle_string(s: &str) -> String {
    let (quote, escape_quote) = if !s.contains('"') {
        ('"', false)
    } else if !s.contains('\'') {
        ('\'', false)
    } else {
        ('"', true)
    };
    let delimiter: String = if is_multiline(s) {
        std::iter::repeat(quote).take(3).collect()
    } else {
        quote.to_string()
    };

    let mut out = String::with_capacity(s.len() + 2 * delimiter.len());
    out.push_str(&delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if escape_quote && c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push_str(&delimiter);
    out
}

/// A JSON string literal (with quotes) for `s`.
#[must_use]
pub fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Escapes `s` for use as XML character data.
#[must_use]
pub fn xml_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}

/// Escapes `s` for use inside a double-quoted XML attribute.
#[must_use]
pub fn xml_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}

/// Makes `s` safe as the body of an XML comment.
#[must_use]
pub fn xml_comment(s: &str) -> String {
    let mut out = s.to_owned();
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    if out.ends_with('-') {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turtle_local_names() {
        assert!(is_turtle_local_name("Widget"));
        assert!(is_turtle_local_name("has-part_1.x"));
        assert!(is_turtle_local_name("123"));
        assert!(is_turtle_local_name("ünïcode"));
        assert!(!is_turtle_local_name(""));
        assert!(!is_turtle_local_name("trailing."));
        assert!(!is_turtle_local_name("a/b"));
        assert!(!is_turtle_local_name("a b"));
        assert!(!is_turtle_local_name("-dash"));
    }

    #[test]
    fn xml_names_are_stricter() {
        assert!(is_xml_ncname("label"));
        assert!(is_xml_ncname("_x.y-z"));
        assert!(!is_xml_ncname("123"));
        assert!(!is_xml_ncname("a:b"));
        assert!(!is_xml_ncname(".dot"));
    }

    #[test]
    fn turtle_quoting_picks_the_cheapest_form() {
        assert_eq!(turtle_string("plain"), "\"plain\"");
        assert_eq!(turtle_string("say \"hi\""), "'say \"hi\"'");
        assert_eq!(turtle_string("it's \"x\""), "\"it's \\\"x\\\"\"");
        assert_eq!(turtle_string("a\\b"), "\"a\\\\b\"");
        assert_eq!(turtle_string("line1\nline2"), "\"\"\"line1\nline2\"\"\"");
    }

    #[test]
    fn json_strings_escape_controls() {
        assert_eq!(json_string("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(json_string("\u{1}"), "\"\\u0001\"");
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(xml_text("a<b & c"), "a&lt;b &amp; c");
        assert_eq!(xml_attribute("\"x\"\n"), "&quot;x&quot;&#10;");
        assert_eq!(xml_comment("a -- b -"), "a - - b - ");
    }
}
