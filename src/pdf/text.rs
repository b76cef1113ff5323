//! Textsuche auf einer Seite.
//!
//! Der Inhaltsstrom wird soweit interpretiert, dass für jeden gezeigten Glyph
//! Position, Box und Herkunft (Operator, Array-Element, Bytebereich) bekannt
//! sind. Darauf bauen `search_for` und die Schwärzung auf.

use std::collections::HashMap;
use std::ops::Range;

use log::debug;
use lopdf::content::Operation;
use lopdf::Object;

use crate::pdf::font::{PdfFont, ASCENT, DESCENT};
use crate::pdf::geometry::{Matrix, Point, Rect};
use crate::pdf::number;

/// Herkunft eines Glyphs im Inhaltsstrom
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSpan {
    /// Index des Text-Operators in der Operationsliste
    pub op_index: usize,
    /// Element im `TJ`-Array, bei `Tj`/`'`/`"` immer 0
    pub element: usize,
    pub bytes: Range<usize>,
    /// Vorschub in `TJ`-Einheiten (1/1000 Textraum)
    pub advance: f32,
}

#[derive(Debug, Clone)]
pub struct Glyph {
    pub text: String,
    pub bbox: Rect,
    pub origin: Point,
    pub font_size: f32,
    pub span: GlyphSpan,
}

/// Ein Fundstelle von `search_for`
#[derive(Debug, Clone)]
pub struct TextMatch {
    pub rect: Rect,
    pub baseline: f32,
    pub font_size: f32,
    pub spans: Vec<GlyphSpan>,
}

impl TextMatch {
    /// Linke Kante auf der Grundlinie, dort beginnt der Ersatztext
    pub fn origin(&self) -> Point {
        Point::new(self.rect.x0, self.baseline)
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

struct Interpreter<'a> {
    fonts: &'a HashMap<Vec<u8>, PdfFont>,
    fallback: PdfFont,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
    glyphs: Vec<Glyph>,
}

fn numbers(operands: &[Object]) -> Vec<f32> {
    operands.iter().filter_map(number).collect()
}

impl<'a> Interpreter<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, PdfFont>) -> Self {
        Self {
            fonts,
            fallback: PdfFont::fallback(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            glyphs: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    fn execute(&mut self, index: usize, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let [a, b, c, d, e, f] = numbers(operands)[..] {
                    self.state.ctm = Matrix::new(a, b, c, d, e, f).multiply(&self.state.ctm);
                }
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1).and_then(number))
                {
                    self.state.font = Some(name.clone());
                    self.state.font_size = size;
                }
            }
            "Td" => {
                if let [tx, ty] = numbers(operands)[..] {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty] = numbers(operands)[..] {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let [a, b, c, d, e, f] = numbers(operands)[..] {
                    self.tm = Matrix::new(a, b, c, d, e, f);
                    self.tlm = self.tm;
                }
            }
            "T*" => self.next_line(),
            "TL" => self.set(operands, |s, v| s.leading = v),
            "Tc" => self.set(operands, |s, v| s.char_spacing = v),
            "Tw" => self.set(operands, |s, v| s.word_spacing = v),
            "Tz" => self.set(operands, |s, v| s.horizontal_scale = v / 100.0),
            "Ts" => self.set(operands, |s, v| s.rise = v),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, index, 0);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, index, 0);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    self.state.word_spacing = aw;
                    self.state.char_spacing = ac;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes, index, 0);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for (element, item) in items.iter().enumerate() {
                        match item {
                            Object::String(bytes, _) => self.show(bytes, index, element),
                            other => {
                                if let Some(adjust) = number(other) {
                                    let tx = -adjust / 1000.0
                                        * self.state.font_size
                                        * self.state.horizontal_scale;
                                    self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn set(&mut self, operands: &[Object], apply: impl Fn(&mut GraphicsState, f32)) {
        if let Some(v) = operands.first().and_then(number) {
            apply(&mut self.state, v);
        }
    }

    fn show(&mut self, bytes: &[u8], op_index: usize, element: usize) {
        let font = self
            .state
            .font
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .unwrap_or(&self.fallback);

        let size = self.state.font_size;
        let th = self.state.horizontal_scale;
        let rise = self.state.rise;

        for (code, range) in font.codes(bytes) {
            let w0 = font.width(code) / 1000.0;
            let word = if font.is_word_space(code, range.len()) {
                self.state.word_spacing
            } else {
                0.0
            };
            let tx = (w0 * size + self.state.char_spacing + word) * th;

            let trm = self.tm.multiply(&self.state.ctm);
            let width = w0 * size * th;
            let bottom = rise + DESCENT * size;
            let top = rise + ASCENT * size;
            let corners = [
                trm.apply(0.0, bottom),
                trm.apply(width, bottom),
                trm.apply(0.0, top),
                trm.apply(width, top),
            ];
            let bbox = Rect::bounding(&corners).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
            let advance = if size != 0.0 {
                (w0 * size + self.state.char_spacing + word) * 1000.0 / size
            } else {
                0.0
            };

            self.glyphs.push(Glyph {
                text: font.decode(code),
                bbox,
                origin: trm.apply(0.0, rise),
                font_size: size * trm.c.hypot(trm.d),
                span: GlyphSpan {
                    op_index,
                    element,
                    bytes: range,
                    advance,
                },
            });

            self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
        }
    }
}

/// Alle Glyphen einer Seite in Reihenfolge des Inhaltsstroms
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    glyphs: Vec<Glyph>,
}

/// Verbindet Glyphen zu Text; `None` markiert eingefügte Trenner
type Chars = Vec<(char, Option<usize>)>;

impl TextLayout {
    pub fn from_operations(operations: &[Operation], fonts: &HashMap<Vec<u8>, PdfFont>) -> Self {
        let mut interpreter = Interpreter::new(fonts);
        for (index, op) in operations.iter().enumerate() {
            interpreter.execute(index, op);
        }
        debug!("Text layout: {} glyphs", interpreter.glyphs.len());
        Self {
            glyphs: interpreter.glyphs,
        }
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    fn chars(&self) -> Chars {
        let mut chars: Chars = Vec::new();
        let mut previous: Option<&Glyph> = None;

        for (index, glyph) in self.glyphs.iter().enumerate() {
            if let Some(prev) = previous {
                let tolerance = prev.font_size.max(1.0);
                let same_line = (glyph.origin.y - prev.origin.y).abs() <= tolerance * 0.5;
                let backwards = glyph.bbox.x0 < prev.bbox.x0 - tolerance * 0.5;
                if !same_line || backwards {
                    chars.push(('\n', None));
                } else {
                    let gap = glyph.bbox.x0 - prev.bbox.x1;
                    let prev_space = prev.text.ends_with(char::is_whitespace);
                    let next_space = glyph.text.starts_with(char::is_whitespace);
                    if gap > tolerance * 0.2 && !prev_space && !next_space {
                        chars.push((' ', None));
                    }
                }
            }
            chars.extend(glyph.text.chars().map(|c| (c, Some(index))));
            previous = Some(glyph);
        }
        chars
    }

    /// Seitentext mit Zeilenumbrüchen, vor allem für Diagnose und Tests
    pub fn text(&self) -> String {
        self.chars().into_iter().map(|(c, _)| c).collect()
    }

    /// Alle nicht überlappenden Vorkommen von `needle`
    pub fn search_for(&self, needle: &str) -> Vec<TextMatch> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return Vec::new();
        }

        let chars = self.chars();
        let mut matches = Vec::new();
        let mut i = 0;
        while i + needle.len() <= chars.len() {
            let window = &chars[i..i + needle.len()];
            if window.iter().zip(&needle).all(|((c, _), n)| c == n) {
                let mut indices: Vec<usize> = window.iter().filter_map(|(_, g)| *g).collect();
                indices.dedup();
                if let Some(found) = self.build_match(&indices) {
                    matches.push(found);
                }
                i += needle.len();
            } else {
                i += 1;
            }
        }
        matches
    }

    fn build_match(&self, indices: &[usize]) -> Option<TextMatch> {
        let first = &self.glyphs[*indices.first()?];
        let rect = indices
            .iter()
            .map(|i| self.glyphs[*i].bbox)
            .fold(first.bbox, |acc, r| acc.union(&r));
        Some(TextMatch {
            rect,
            baseline: first.origin.y,
            font_size: first.font_size,
            spans: indices.iter().map(|i| self.glyphs[*i].span.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::font::StandardFont;

    fn fonts() -> HashMap<Vec<u8>, PdfFont> {
        let mut fonts = HashMap::new();
        fonts.insert(b"F1".to_vec(), PdfFont::standard(StandardFont::Helvetica));
        fonts.insert(b"F2".to_vec(), PdfFont::standard(StandardFont::Courier));
        fonts.insert(b"F3".to_vec(), PdfFont::standard(StandardFont::TimesRoman));
        fonts
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn ints(values: &[i64]) -> Vec<Object> {
        values.iter().map(|v| Object::Integer(*v)).collect()
    }

    fn text_ops(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)]),
            op("Td", vec![Object::Integer(x), Object::Integer(y)]),
            op("Tj", vec![Object::string_literal(text)]),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_search_reports_left_edge_and_baseline() {
        let ops = text_ops("F1", 12, 100, 700, "[Employee Name]");
        let layout = TextLayout::from_operations(&ops, &fonts());

        let found = layout.search_for("[Employee Name]");
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert!((m.rect.x0 - 100.0).abs() < 1e-3);
        assert!((m.baseline - 700.0).abs() < 1e-3);
        assert!((m.rect.height() - 12.0).abs() < 1e-3);
        assert!((m.font_size - 12.0).abs() < 1e-3);
        assert_eq!(m.origin(), Point::new(m.rect.x0, 700.0));
    }

    #[test]
    fn test_search_inside_longer_string_uses_glyph_widths() {
        // Courier: jeder Glyph 600/1000 em
        let ops = text_ops("F2", 10, 50, 400, "Date: DD-MMM-YYYY");
        let layout = TextLayout::from_operations(&ops, &fonts());

        let found = layout.search_for("DD-MMM-YYYY");
        assert_eq!(found.len(), 1);
        assert!((found[0].rect.x0 - (50.0 + 6.0 * 6.0)).abs() < 1e-3);
        assert!((found[0].rect.width() - 11.0 * 6.0).abs() < 1e-3);
        assert_eq!(found[0].spans.len(), 11);
        assert_eq!(found[0].spans[0].bytes, 6..7);
    }

    #[test]
    fn test_search_in_times_roman_line() {
        let ops = text_ops("F3", 12, 100, 400, "Date: DD-MMM-YYYY");
        let layout = TextLayout::from_operations(&ops, &fonts());

        let found = layout.search_for("DD-MMM-YYYY");
        assert_eq!(found.len(), 1);
        assert!((found[0].rect.x0 - 128.992).abs() < 1e-3);
    }

    #[test]
    fn test_multiple_matches_and_absent_needle() {
        let mut ops = text_ops("F1", 12, 100, 700, "DD-MMM-YYYY");
        ops.extend(text_ops("F1", 12, 100, 500, "DD-MMM-YYYY"));
        let layout = TextLayout::from_operations(&ops, &fonts());

        assert_eq!(layout.search_for("DD-MMM-YYYY").len(), 2);
        assert!(layout.search_for("[Employee Name]").is_empty());
        assert!(layout.search_for("").is_empty());
    }

    #[test]
    fn test_tj_array_with_kerning_is_joined() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), Object::Integer(10)]),
            op("Tm", ints(&[1, 0, 0, 1, 20, 30])),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("[Employee"),
                    Object::Integer(-100),
                    Object::string_literal(" Name]"),
                ])],
            ),
            op("ET", vec![]),
        ];
        let layout = TextLayout::from_operations(&ops, &fonts());
        let found = layout.search_for("[Employee Name]");
        assert_eq!(found.len(), 1);
        // 15 Glyphen zu 6pt plus 1pt Kerning
        assert!((found[0].rect.width() - 91.0).abs() < 1e-3);
        assert_eq!(found[0].spans.last().map(|s| s.element), Some(2));
    }

    #[test]
    fn test_transforms_apply_ctm_and_restore_on_q() {
        let mut ops = vec![
            op("q", vec![]),
            op("cm", ints(&[2, 0, 0, 2, 10, 10])),
        ];
        ops.extend(text_ops("F1", 10, 5, 5, "Scaled"));
        ops.push(op("Q", vec![]));
        ops.extend(text_ops("F1", 10, 5, 5, "Plain"));
        let layout = TextLayout::from_operations(&ops, &fonts());

        let scaled = &layout.search_for("Scaled")[0];
        assert!((scaled.rect.x0 - 20.0).abs() < 1e-3);
        assert!((scaled.baseline - 20.0).abs() < 1e-3);
        assert!((scaled.font_size - 20.0).abs() < 1e-3);

        let plain = &layout.search_for("Plain")[0];
        assert!((plain.rect.x0 - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_words_in_separate_operators_get_virtual_space() {
        let mut ops = text_ops("F2", 10, 100, 300, "[Employee");
        ops.extend(text_ops("F2", 10, 160, 300, "Name]"));
        let layout = TextLayout::from_operations(&ops, &fonts());
        assert_eq!(layout.search_for("[Employee Name]").len(), 1);
        assert!(layout.text().contains("[Employee Name]"));
    }

    #[test]
    fn test_new_line_breaks_matching() {
        let mut ops = text_ops("F2", 10, 100, 300, "DD-MMM-");
        ops.extend(text_ops("F2", 10, 100, 280, "YYYY"));
        let layout = TextLayout::from_operations(&ops, &fonts());
        assert!(layout.search_for("DD-MMM-YYYY").is_empty());
    }
}
