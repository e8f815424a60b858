//! Validators for the writer's testable properties.
//!
//! Each validator checks one property over one fixture, under both the
//! default options and with blank-node inlining on.

pub mod collections;
pub mod cross_format;
pub mod determinism;
pub mod idempotence;
pub mod roundtrip;

use rdf_canon::{SourceFormat, TargetFormat, WriterOptions};

/// Every output format, in report order.
pub const TARGET_FORMATS: [TargetFormat; 3] =
    [TargetFormat::Turtle, TargetFormat::RdfXml, TargetFormat::JsonLd];

/// The parser that reads back output written in `format`.
#[must_use]
pub fn reader_for(format: TargetFormat) -> SourceFormat {
    match format {
        TargetFormat::Turtle => SourceFormat::Turtle,
        TargetFormat::RdfXml => SourceFormat::RdfXml,
        TargetFormat::JsonLd => SourceFormat::JsonLd,
    }
}

/// The option sets every fixture is checked under.
pub fn option_sets() -> Vec<(&'static str, WriterOptions)> {
    vec![
        ("default", WriterOptions::default()),
        (
            "inline",
            WriterOptions {
                inline_blank_nodes: true,
                ..WriterOptions::default()
            },
        ),
    ]
}

/// The first line where `expected` and `actual` differ, for report details.
pub fn first_difference(expected: &str, actual: &str) -> Vec<String> {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (None, None) => return Vec::new(),
            (e, a) => {
                return vec![
                    format!("line {line} expected: {}", e.unwrap_or("<end of output>")),
                    format!("line {line} actual:   {}", a.unwrap_or("<end of output>")),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_first_differing_line() {
        assert!(first_difference("a\nb", "a\nb").is_empty());
        assert_eq!(
            first_difference("a\nb\nc", "a\nx"),
            vec!["line 2 expected: b".to_owned(), "line 2 actual:   x".to_owned()]
        );
        assert_eq!(first_difference("a", "a\nb")[0], "line 2 expected: <end of output>");
    }
}
