//! Template parser properties: re-joining segments reproduces the input exactly.

use taskflow_compiler::template::{Placeholder, Segment, parse_template, placeholders, to_source};

const PLACEHOLDERS: &[&str] = &[
    "{task_input}",
    "{last_step_result}",
    "{memory}",
    r#"{memory["user_input"]}"#,
    "{memory['conversation history']}",
];

const LITERALS: &[&str] = &[
    "",
    "plain text ",
    "{",
    "}",
    "{{",
    "{memory[",
    "{\"x\": 1}",
    "{unknown}",
    "memory}",
    "ünïcödé ✓ ",
];

#[test]
fn round_trip_over_literal_placeholder_mixes() {
    for &lead in LITERALS {
        for &first in PLACEHOLDERS {
            for &mid in LITERALS {
                for &second in PLACEHOLDERS {
                    for &tail in LITERALS {
                        let text = format!("{lead}{first}{mid}{second}{tail}");
                        let segments = parse_template(&text);
                        assert_eq!(to_source(&segments), text, "segments: {:?}", segments);
                    }
                }
            }
        }
    }
}

#[test]
fn brace_free_literals_keep_every_placeholder() {
    for &first in PLACEHOLDERS {
        for &second in PLACEHOLDERS {
            let text = format!("Q: {first} / ctx: {second}.");
            let segments = parse_template(&text);
            assert_eq!(placeholders(&segments).count(), 2, "text: {text}");
            assert_eq!(segments.len(), 5);
        }
    }
}

#[test]
fn no_adjacent_literals() {
    let segments = parse_template("a { b } {task_input} {x");
    for pair in segments.windows(2) {
        assert!(
            !matches!(pair, [Segment::Literal { .. }, Segment::Literal { .. }]),
            "{:?}",
            segments
        );
    }
}

#[test]
fn memory_key_preserves_quote_style() {
    let segments = parse_template("{memory['k']}");
    assert_eq!(
        segments,
        vec![Segment::Placeholder {
            form: Placeholder::MemoryKey {
                key: "k".into(),
                quote: '\''
            }
        }]
    );
    assert_eq!(to_source(&segments), "{memory['k']}");
}
