//! Entfernt Glyphen aus Text-Operatoren.
//!
//! Jeder entfernte Glyph wird durch eine `TJ`-Verschiebung derselben Breite
//! ersetzt, damit der restliche Text an seiner Stelle bleibt.

use std::collections::BTreeMap;
use std::ops::Range;

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::pdf::text::GlyphSpan;

type Cuts = BTreeMap<usize, Vec<(Range<usize>, f32)>>;

/// Liefert die Operationsliste ohne die Bytes aus `spans`
pub fn remove_glyphs(operations: &[Operation], spans: &[GlyphSpan]) -> Vec<Operation> {
    let mut by_op: BTreeMap<usize, Cuts> = BTreeMap::new();
    for span in spans {
        by_op
            .entry(span.op_index)
            .or_default()
            .entry(span.element)
            .or_default()
            .push((span.bytes.clone(), span.advance));
    }

    let mut result = Vec::with_capacity(operations.len() + by_op.len() * 3);
    for (index, op) in operations.iter().enumerate() {
        match by_op.get(&index) {
            Some(cuts) => result.extend(rewrite(op, cuts)),
            None => result.push(op.clone()),
        }
    }
    result
}

fn rewrite(op: &Operation, cuts: &Cuts) -> Vec<Operation> {
    let operands = &op.operands;
    let mut prefix = Vec::new();
    let elements: Vec<Object> = match op.operator.as_str() {
        "Tj" => operands.first().cloned().into_iter().collect(),
        "'" => {
            prefix.push(Operation::new("T*", vec![]));
            operands.first().cloned().into_iter().collect()
        }
        "\"" => {
            if let (Some(aw), Some(ac)) = (operands.first(), operands.get(1)) {
                prefix.push(Operation::new("Tw", vec![aw.clone()]));
                prefix.push(Operation::new("Tc", vec![ac.clone()]));
            }
            prefix.push(Operation::new("T*", vec![]));
            operands.get(2).cloned().into_iter().collect()
        }
        "TJ" => match operands.first() {
            Some(Object::Array(items)) => items.clone(),
            _ => return vec![op.clone()],
        },
        _ => return vec![op.clone()],
    };

    let mut array: Vec<Object> = Vec::new();
    for (element, item) in elements.into_iter().enumerate() {
        match (item, cuts.get(&element)) {
            (Object::String(bytes, format), Some(ranges)) => {
                cut_string(&bytes, format, ranges, &mut array);
            }
            (other, _) => push_item(&mut array, other),
        }
    }

    prefix.push(Operation::new("TJ", vec![Object::Array(array)]));
    prefix
}

fn cut_string(
    bytes: &[u8],
    format: StringFormat,
    ranges: &[(Range<usize>, f32)],
    array: &mut Vec<Object>,
) {
    let mut ranges = ranges.to_vec();
    ranges.sort_by_key(|(range, _)| range.start);

    let mut cursor = 0;
    for (range, advance) in ranges {
        if range.start < cursor || range.end > bytes.len() {
            continue;
        }
        if range.start > cursor {
            push_item(array, Object::String(bytes[cursor..range.start].to_vec(), format.clone()));
        }
        push_item(array, Object::Real(-advance));
        cursor = range.end;
    }
    if cursor < bytes.len() {
        push_item(array, Object::String(bytes[cursor..].to_vec(), format.clone()));
    }
}

/// Fasst aufeinanderfolgende Verschiebungen zusammen
fn push_item(array: &mut Vec<Object>, item: Object) {
    let adjust = match &item {
        Object::Real(v) => Some(*v),
        Object::Integer(v) => Some(*v as f32),
        _ => None,
    };
    if let (Some(adjust), Some(last)) = (adjust, array.last_mut()) {
        match last {
            Object::Real(prev) => {
                *prev += adjust;
                return;
            }
            Object::Integer(prev) => {
                let merged = *prev as f32 + adjust;
                *last = Object::Real(merged);
                return;
            }
            _ => {}
        }
    }
    array.push(item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(op_index: usize, element: usize, bytes: Range<usize>, advance: f32) -> GlyphSpan {
        GlyphSpan {
            op_index,
            element,
            bytes,
            advance,
        }
    }

    #[test]
    fn test_tj_becomes_tj_array_with_gap() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tj", vec![Object::string_literal("Date: DD")]),
            Operation::new("ET", vec![]),
        ];
        let spans = vec![span(1, 0, 6..7, 600.0), span(1, 0, 7..8, 600.0)];

        let result = remove_glyphs(&ops, &spans);
        assert_eq!(result.len(), 3);
        assert_eq!(result[1].operator, "TJ");
        match &result[1].operands[0] {
            Object::Array(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[0], Object::String(b, _) if b == b"Date: "));
                assert!(matches!(items[1], Object::Real(v) if (v + 1200.0).abs() < 1e-3));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_tj_array_keeps_existing_kerning() {
        let ops = vec![Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("AB"),
                Object::Integer(-50),
                Object::string_literal("CD"),
            ])],
        )];
        let spans = vec![span(0, 0, 1..2, 500.0), span(0, 2, 0..1, 400.0)];

        let result = remove_glyphs(&ops, &spans);
        match &result[0].operands[0] {
            Object::Array(items) => {
                assert_eq!(items.len(), 3);
                assert!(matches!(&items[0], Object::String(b, _) if b == b"A"));
                // -500 (B), -50 (Kerning), -400 (C) zusammengefasst
                assert!(matches!(items[1], Object::Real(v) if (v + 950.0).abs() < 1e-3));
                assert!(matches!(&items[2], Object::String(b, _) if b == b"D"));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_operators_keep_line_advance() {
        let ops = vec![Operation::new(
            "\"",
            vec![Object::Integer(2), Object::Integer(1), Object::string_literal("XY")],
        )];
        let result = remove_glyphs(&ops, &[span(0, 0, 0..1, 300.0)]);
        let operators: Vec<&str> = result.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(operators, vec!["Tw", "Tc", "T*", "TJ"]);
    }

    #[test]
    fn test_untouched_operations_are_cloned() {
        let ops = vec![Operation::new("Tj", vec![Object::string_literal("keep")])];
        let result = remove_glyphs(&ops, &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].operator, "Tj");
    }
}
