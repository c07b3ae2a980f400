//! Placeholder parsing for prompt templates and tool input expressions.
//!
//! Recognized tokens: `{task_input}`, `{last_step_result}`, `{memory}` and
//! `{memory["key"]}` / `{memory['key']}`. Anything else is literal text.

use serde::{Deserialize, Serialize};

const TASK_INPUT: &str = "{task_input}";
const LAST_STEP_RESULT: &str = "{last_step_result}";
const MEMORY: &str = "{memory}";
const MEMORY_KEY_OPEN: &str = "{memory[";
const MEMORY_KEY_CLOSE: &str = "]}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Placeholder {
    /// Value passed into the task (user input for the first task).
    TaskInput,
    /// Result of the previous step in the same task.
    LastStepResult,
    /// The whole shared memory object.
    Memory,
    /// `memory[<quote>key<quote>]`
    MemoryKey { key: String, quote: char },
}

impl Placeholder {
    /// The exact source token this placeholder was parsed from.
    pub fn source(&self) -> String {
        match self {
            Placeholder::TaskInput => TASK_INPUT.to_string(),
            Placeholder::LastStepResult => LAST_STEP_RESULT.to_string(),
            Placeholder::Memory => MEMORY.to_string(),
            Placeholder::MemoryKey { key, quote } => {
                format!("{MEMORY_KEY_OPEN}{quote}{key}{quote}{MEMORY_KEY_CLOSE}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    Literal { value: String },
    Placeholder { form: Placeholder },
}

impl Segment {
    pub fn source(&self) -> String {
        match self {
            Segment::Literal { value } => value.clone(),
            Segment::Placeholder { form } => form.source(),
        }
    }
}

/// Split `text` into literal and placeholder segments, in input order.
///
/// Never fails: unmatched or unknown brace sequences stay in the literal text.
/// Adjacent literal text is merged into one segment.
pub fn parse_template(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match match_placeholder(candidate) {
            Some((form, len)) => {
                flush_literal(&mut literal, &mut segments);
                segments.push(Segment::Placeholder { form });
                rest = &candidate[len..];
            }
            None => {
                literal.push('{');
                rest = &candidate[1..];
            }
        }
    }

    literal.push_str(rest);
    flush_literal(&mut literal, &mut segments);
    segments
}

/// Re-join segments into source text. Inverse of `parse_template`.
pub fn to_source(segments: &[Segment]) -> String {
    segments.iter().map(Segment::source).collect()
}

pub fn placeholders(segments: &[Segment]) -> impl Iterator<Item = &Placeholder> {
    segments.iter().filter_map(|s| match s {
        Segment::Placeholder { form } => Some(form),
        Segment::Literal { .. } => None,
    })
}

/// Brace tokens left in literal text that look like a mistyped placeholder,
/// e.g. `{task_imput}` or `{memory[key]}`. Dict/JSON literals such as
/// `{"x": 1}` are not reported.
pub fn unrecognized_tokens(segments: &[Segment]) -> Vec<String> {
    let mut tokens = Vec::new();
    for segment in segments {
        let Segment::Literal { value } = segment else {
            continue;
        };
        let mut rest = value.as_str();
        while let Some(open) = rest.find('{') {
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('}') else {
                break;
            };
            let inner = &after_open[..close];
            if inner.contains('{') {
                rest = after_open;
                continue;
            }
            if looks_like_placeholder(inner) {
                tokens.push(format!("{{{inner}}}"));
            }
            rest = &after_open[close + 1..];
        }
    }
    tokens
}

fn match_placeholder(s: &str) -> Option<(Placeholder, usize)> {
    // Longest form first so `{memory[...]}` is never read as `{memory}`.
    if let Some(found) = match_memory_key(s) {
        return Some(found);
    }
    [
        (TASK_INPUT, Placeholder::TaskInput),
        (LAST_STEP_RESULT, Placeholder::LastStepResult),
        (MEMORY, Placeholder::Memory),
    ]
    .into_iter()
    .find(|(token, _)| s.starts_with(token))
    .map(|(token, form)| (form, token.len()))
}

fn match_memory_key(s: &str) -> Option<(Placeholder, usize)> {
    let after_open = s.strip_prefix(MEMORY_KEY_OPEN)?;
    let quote = after_open.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &after_open[1..];
    let close = body.find(quote)?;
    if close == 0 {
        return None;
    }
    if !body[close + 1..].starts_with(MEMORY_KEY_CLOSE) {
        return None;
    }
    let len = MEMORY_KEY_OPEN.len() + 1 + close + 1 + MEMORY_KEY_CLOSE.len();
    Some((
        Placeholder::MemoryKey {
            key: body[..close].to_string(),
            quote,
        },
        len,
    ))
}

fn looks_like_placeholder(inner: &str) -> bool {
    if !inner.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return false;
    }
    let ident_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let tail = &inner[ident_end..];
    tail.is_empty() || tail.starts_with('[')
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal {
            value: std::mem::take(literal),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: &str) -> Segment {
        Segment::Literal {
            value: value.into(),
        }
    }

    fn ph(form: Placeholder) -> Segment {
        Segment::Placeholder { form }
    }

    #[test]
    fn plain_text_is_one_literal() {
        assert_eq!(parse_template("hello world"), vec![lit("hello world")]);
        assert!(parse_template("").is_empty());
    }

    #[test]
    fn mixed_prompt() {
        let segments = parse_template("Respond to: {task_input}\nPrev: {last_step_result}.");
        assert_eq!(
            segments,
            vec![
                lit("Respond to: "),
                ph(Placeholder::TaskInput),
                lit("\nPrev: "),
                ph(Placeholder::LastStepResult),
                lit("."),
            ]
        );
    }

    #[test]
    fn memory_key_wins_over_memory() {
        let segments = parse_template(r#"{memory["user_input"]}{memory}"#);
        assert_eq!(
            segments,
            vec![
                ph(Placeholder::MemoryKey {
                    key: "user_input".into(),
                    quote: '"'
                }),
                ph(Placeholder::Memory),
            ]
        );
    }

    #[test]
    fn single_quoted_key_may_contain_double_quotes() {
        let segments = parse_template(r#"{memory['say "hi"']}"#);
        assert_eq!(
            segments,
            vec![ph(Placeholder::MemoryKey {
                key: r#"say "hi""#.into(),
                quote: '\''
            })]
        );
    }

    #[test]
    fn malformed_forms_stay_literal() {
        for text in [
            "{memory[\"\"]}",
            "{memory[\"a']}",
            "{memory[key]}",
            "{task_input",
            "{{task_input",
            "}{",
        ] {
            assert_eq!(parse_template(text), vec![lit(text)], "input: {text}");
        }
    }

    #[test]
    fn nested_braces_around_placeholder() {
        let segments = parse_template("{{task_input}}");
        assert_eq!(
            segments,
            vec![lit("{"), ph(Placeholder::TaskInput), lit("}")]
        );
    }

    #[test]
    fn unrecognized_identifier_tokens_are_reported() {
        let segments = parse_template("Hi {task_imput} and {memory[key]} and {memory}");
        assert_eq!(
            unrecognized_tokens(&segments),
            vec!["{task_imput}".to_string(), "{memory[key]}".to_string()]
        );
    }

    #[test]
    fn dict_literals_are_not_reported() {
        let segments = parse_template(r#"{"x": int(task_input), "y": 2, "operation": "add"}"#);
        assert!(unrecognized_tokens(&segments).is_empty());
    }

    #[test]
    fn placeholders_iterates_in_order() {
        let segments = parse_template("{memory} then {task_input}");
        let forms: Vec<_> = placeholders(&segments).cloned().collect();
        assert_eq!(forms, vec![Placeholder::Memory, Placeholder::TaskInput]);
    }
}
