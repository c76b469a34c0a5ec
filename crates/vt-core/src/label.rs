//! Display-label codec for visual nodes.
//!
//! Valued nodes display as `"{name}: {formatted value}"`. Formatting is
//! one-way at projection time; the inverse parse runs only when the user
//! edits a label, splitting on the first `": "` and then trying, in order:
//! numeric literal, comma list, bracketed JSON, plain text. Labels whose
//! free text contains a literal `": "` parse best-effort, a known,
//! accepted precision loss confined to nodes the user actually retyped.

use crate::model::NodeValue;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Formatting (structured → label) ─────────────────────────────────────

/// Render a value for display inside a label or prompt line.
///
/// Strings pass through; numbers stringify (integral values without a
/// trailing `.0`); lists join with `", "`; maps serialize to compact JSON.
pub fn format_value(value: &NodeValue) -> String {
    match value {
        NodeValue::Bool(b) => b.to_string(),
        NodeValue::Number(n) => format_number(*n),
        NodeValue::Text(s) => s.clone(),
        NodeValue::List(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        NodeValue::Map(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Integral numbers print without a fractional part: `80`, not `80.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// The display label for a `(name, value)` pair: bare `name` when there is
/// no value, `"name: value"` otherwise.
pub fn display_label(name: &str, value: Option<&NodeValue>) -> String {
    match value {
        Some(v) => format!("{name}: {}", format_value(v)),
        None => name.to_string(),
    }
}

// ─── Parsing (label → structured) ────────────────────────────────────────

/// Invert `display_label` best-effort: split on the first `": "`, then
/// interpret the remainder as a value literal. A label without the
/// separator is a bare name.
pub fn parse_label(label: &str) -> (String, Option<NodeValue>) {
    match label.split_once(": ") {
        Some((name, raw)) => (name.trim().to_string(), Some(parse_value(raw.trim()))),
        None => (label.trim().to_string(), None),
    }
}

/// Interpret a value literal: number → comma list → bracketed JSON →
/// plain text. Total: anything unrecognized is text.
pub fn parse_value(raw: &str) -> NodeValue {
    let mut rest = raw;
    if let Ok(n) = number_literal.parse_next(&mut rest)
        && rest.is_empty()
    {
        return NodeValue::Number(n);
    }

    if raw.contains(", ") {
        return NodeValue::List(
            raw.split(", ")
                .map(|item| NodeValue::Text(item.trim().to_string()))
                .collect(),
        );
    }

    if (raw.starts_with('{') || raw.starts_with('['))
        && let Ok(v) = serde_json::from_str::<NodeValue>(raw)
    {
        return v;
    }

    NodeValue::Text(raw.to_string())
}

fn number_literal(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn format_scalars() {
        assert_eq!(format_value(&NodeValue::Text("warm".into())), "warm");
        assert_eq!(format_value(&NodeValue::Number(80.0)), "80");
        assert_eq!(format_value(&NodeValue::Number(0.35)), "0.35");
        assert_eq!(
            format_value(&NodeValue::List(vec![
                NodeValue::Text("golden".into()),
                NodeValue::Text("amber".into()),
            ])),
            "golden, amber"
        );
    }

    #[test]
    fn format_map_is_compact_json() {
        let mut m = BTreeMap::new();
        m.insert("intro".to_string(), NodeValue::Text("gentle".into()));
        let rendered = format_value(&NodeValue::Map(m));
        assert_eq!(rendered, r#"{"intro":"gentle"}"#);
    }

    #[test]
    fn label_roundtrip_for_scalars() {
        let (name, value) = parse_label("Tempo: 80");
        assert_eq!(name, "Tempo");
        assert_eq!(value, Some(NodeValue::Number(80.0)));
        assert_eq!(display_label(&name, value.as_ref()), "Tempo: 80");

        let (name, value) = parse_label("Primary Emotions: nostalgia, warmth");
        assert_eq!(name, "Primary Emotions");
        assert_eq!(
            value,
            Some(NodeValue::List(vec![
                NodeValue::Text("nostalgia".into()),
                NodeValue::Text("warmth".into()),
            ]))
        );
    }

    #[test]
    fn bare_label_has_no_value() {
        let (name, value) = parse_label("Instrumentation");
        assert_eq!(name, "Instrumentation");
        assert_eq!(value, None);
    }

    #[test]
    fn negative_and_fractional_numbers() {
        assert_eq!(parse_value("-3.5"), NodeValue::Number(-3.5));
        // Trailing junk is not a number
        assert_eq!(parse_value("80 bpm"), NodeValue::Text("80 bpm".into()));
    }

    #[test]
    fn colon_in_free_text_parses_best_effort() {
        // Documented ambiguity: the split is on the FIRST ": ".
        let (name, value) = parse_label("Note: key: D minor");
        assert_eq!(name, "Note");
        assert_eq!(value, Some(NodeValue::Text("key: D minor".into())));
    }
}
