//! Schriftmetriken und Zeichenkodierung für die Textsuche und das Einfügen von Text.

use std::collections::HashMap;
use std::ops::Range;

use log::{debug, warn};
use lopdf::{Dictionary, Document, Object};

use crate::pdf::{number, resolve};

/// Glyphbreiten der Standard-14-Schriften für ASCII 32..=126 (in 1/1000 em)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
    667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
    500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
    722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
    556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

/// Oberkante der Glyphbox relativ zur Grundlinie (em)
pub const ASCENT: f32 = 0.75;
/// Unterkante der Glyphbox relativ zur Grundlinie (em)
pub const DESCENT: f32 = -0.25;

/// Nicht eingebettete Standardschriften, mit denen wir messen und schreiben
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
        }
    }

    /// Ordnet einen `/BaseFont`-Namen (auch Subset-Präfixe wie `ABCDEF+Arial-Bold`) zu
    pub fn from_base_font(name: &str) -> Option<Self> {
        let name = name.split_once('+').map(|(_, rest)| rest).unwrap_or(name);
        let lower = name.to_ascii_lowercase();
        let bold = lower.contains("bold");
        let italic = lower.contains("italic") || lower.contains("oblique");
        if lower.starts_with("courier") {
            Some(StandardFont::Courier)
        } else if lower.starts_with("helvetica") || lower.starts_with("arial") {
            if bold {
                Some(StandardFont::HelveticaBold)
            } else {
                Some(StandardFont::Helvetica)
            }
        } else if lower.starts_with("times") {
            Some(match (bold, italic) {
                (false, false) => StandardFont::TimesRoman,
                (true, false) => StandardFont::TimesBold,
                (false, true) => StandardFont::TimesItalic,
                (true, true) => StandardFont::TimesBoldItalic,
            })
        } else {
            None
        }
    }

    /// Breite eines WinAnsi-Codes in 1/1000 em
    pub fn width(&self, code: u8) -> f32 {
        match self {
            StandardFont::Courier => 600.0,
            StandardFont::Helvetica => Self::lookup(&HELVETICA_WIDTHS, code, 556.0),
            StandardFont::HelveticaBold => Self::lookup(&HELVETICA_BOLD_WIDTHS, code, 556.0),
            StandardFont::TimesRoman => Self::lookup(&TIMES_ROMAN_WIDTHS, code, 500.0),
            StandardFont::TimesBold => Self::lookup(&TIMES_BOLD_WIDTHS, code, 500.0),
            StandardFont::TimesItalic => Self::lookup(&TIMES_ITALIC_WIDTHS, code, 500.0),
            StandardFont::TimesBoldItalic => Self::lookup(&TIMES_BOLD_ITALIC_WIDTHS, code, 500.0),
        }
    }

    fn lookup(table: &[u16; 95], code: u8, other: f32) -> f32 {
        match code {
            32..=126 => f32::from(table[usize::from(code - 32)]),
            _ => other,
        }
    }

    /// Laufweite eines Textes in Punkt
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = encode_win_ansi(text).iter().map(|c| self.width(*c)).sum();
        units * size / 1000.0
    }
}

/// WinAnsi-Kodierung, nicht darstellbare Zeichen werden zu `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if let Some(pos) = WIN_ANSI_HIGH.iter().position(|(_, ch)| *ch == c) {
                return WIN_ANSI_HIGH[pos].0;
            }
            match c as u32 {
                0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
                _ => b'?',
            }
        })
        .collect()
}

pub fn decode_win_ansi(code: u8) -> char {
    if let Some((_, ch)) = WIN_ANSI_HIGH.iter().find(|(b, _)| *b == code) {
        return *ch;
    }
    char::from(code)
}

/// Abweichungen von Latin-1 im Bereich 0x80..=0x9F
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '€'),
    (0x82, '‚'),
    (0x83, 'ƒ'),
    (0x84, '„'),
    (0x85, '…'),
    (0x86, '†'),
    (0x87, '‡'),
    (0x88, 'ˆ'),
    (0x89, '‰'),
    (0x8A, 'Š'),
    (0x8B, '‹'),
    (0x8C, 'Œ'),
    (0x8E, 'Ž'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x98, '˜'),
    (0x99, '™'),
    (0x9A, 'š'),
    (0x9B, '›'),
    (0x9C, 'œ'),
    (0x9E, 'ž'),
    (0x9F, 'Ÿ'),
];

/// Eine Schrift aus den Seitenressourcen, soweit für Textsuche nötig
#[derive(Debug, Clone)]
pub struct PdfFont {
    pub base_font: String,
    composite: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    default_width: f32,
    standard: Option<StandardFont>,
    to_unicode: Option<HashMap<u32, String>>,
}

impl PdfFont {
    /// Ersatz, wenn `Tf` eine unbekannte Ressource nennt
    pub fn fallback() -> Self {
        Self::standard(StandardFont::Helvetica)
    }

    pub fn standard(font: StandardFont) -> Self {
        Self {
            base_font: font.base_font().to_string(),
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: 0.0,
            standard: Some(font),
            to_unicode: None,
        }
    }

    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = match dict.get(b"BaseFont").map(|o| resolve(doc, o)) {
            Ok(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => String::new(),
        };
        let composite = matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Type0");
        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| match resolve(doc, o) {
                Object::Stream(stream) => stream
                    .decompressed_content()
                    .ok()
                    .or_else(|| Some(stream.content.clone())),
                _ => None,
            })
            .map(|bytes| parse_to_unicode(&String::from_utf8_lossy(&bytes)));

        let mut font = PdfFont {
            standard: StandardFont::from_base_font(&base_font),
            base_font,
            composite,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: if composite { 1000.0 } else { 0.0 },
            to_unicode,
        };

        if composite {
            font.load_cid_widths(doc, dict);
        } else {
            font.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| number(resolve(doc, o)))
                .map(|v| v as u32)
                .unwrap_or(0);
            if let Ok(Object::Array(widths)) = dict.get(b"Widths").map(|o| resolve(doc, o)) {
                font.widths = widths
                    .iter()
                    .map(|w| number(resolve(doc, w)).unwrap_or(0.0))
                    .collect();
            }
            if let Ok(Object::Dictionary(descriptor)) =
                dict.get(b"FontDescriptor").map(|o| resolve(doc, o))
            {
                font.default_width = descriptor
                    .get(b"MissingWidth")
                    .ok()
                    .and_then(|o| number(resolve(doc, o)))
                    .unwrap_or(0.0);
            }
        }

        if !font.composite && font.widths.is_empty() && font.standard.is_none() {
            warn!(
                "Font '{}' has no /Widths and no built-in metrics, text positions on it are estimates",
                font.base_font
            );
        }

        debug!(
            "Loaded font {} (composite: {}, widths: {}, cmap: {})",
            font.base_font,
            font.composite,
            font.widths.len() + font.cid_widths.len(),
            font.to_unicode.is_some()
        );
        font
    }

    fn load_cid_widths(&mut self, doc: &Document, dict: &Dictionary) {
        let descendant = match dict.get(b"DescendantFonts").map(|o| resolve(doc, o)) {
            Ok(Object::Array(fonts)) => match fonts.first().map(|o| resolve(doc, o)) {
                Some(Object::Dictionary(d)) => d,
                _ => return,
            },
            _ => return,
        };

        if let Some(dw) = descendant.get(b"DW").ok().and_then(|o| number(resolve(doc, o))) {
            self.default_width = dw;
        }

        let entries = match descendant.get(b"W").map(|o| resolve(doc, o)) {
            Ok(Object::Array(entries)) => entries,
            _ => return,
        };

        // Formen: `c [w1 w2 ...]` oder `c_first c_last w`
        let mut i = 0;
        while i < entries.len() {
            let Some(first) = number(resolve(doc, &entries[i])) else {
                break;
            };
            match entries.get(i + 1).map(|o| resolve(doc, o)) {
                Some(Object::Array(ws)) => {
                    for (offset, w) in ws.iter().enumerate() {
                        if let Some(w) = number(resolve(doc, w)) {
                            self.cid_widths.insert(first as u32 + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let (Some(last), Some(w)) = (
                        number(last),
                        entries.get(i + 2).and_then(|o| number(resolve(doc, o))),
                    ) else {
                        break;
                    };
                    for cid in first as u32..=last as u32 {
                        self.cid_widths.insert(cid, w);
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    /// Zerlegt einen Textstring in Zeichencodes samt Bytebereich
    pub fn codes(&self, bytes: &[u8]) -> Vec<(u32, Range<usize>)> {
        if self.composite {
            bytes
                .chunks(2)
                .enumerate()
                .map(|(i, chunk)| {
                    let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                    (code, i * 2..i * 2 + chunk.len())
                })
                .collect()
        } else {
            bytes
                .iter()
                .enumerate()
                .map(|(i, b)| (u32::from(*b), i..i + 1))
                .collect()
        }
    }

    /// Glyphbreite in 1/1000 Textraumeinheiten
    pub fn width(&self, code: u32) -> f32 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        if code >= self.first_char {
            if let Some(w) = self.widths.get((code - self.first_char) as usize) {
                return *w;
            }
        }
        match self.standard {
            Some(font) if self.widths.is_empty() => font.width(code as u8),
            _ if self.default_width > 0.0 => self.default_width,
            _ => 500.0,
        }
    }

    /// Wortabstand `Tw` gilt nur für den Einzelbyte-Code 32
    pub fn is_word_space(&self, code: u32, byte_len: usize) -> bool {
        code == 32 && byte_len == 1
    }

    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|map| map.get(&code)) {
            return text.clone();
        }
        if self.composite {
            return char::from_u32(code)
                .map(String::from)
                .unwrap_or_else(|| "\u{FFFD}".to_string());
        }
        decode_win_ansi(code as u8).to_string()
    }
}

#[derive(Debug, PartialEq)]
enum CmapToken {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
}

fn cmap_tokens(section: &str) -> Vec<CmapToken> {
    let mut tokens = Vec::new();
    let mut chars = section.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut hex = String::new();
                for h in chars.by_ref() {
                    if h == '>' {
                        break;
                    }
                    if h.is_ascii_hexdigit() {
                        hex.push(h);
                    }
                }
                if hex.len() % 2 == 1 {
                    hex.push('0');
                }
                let bytes = (0..hex.len())
                    .step_by(2)
                    .filter_map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                    .collect();
                tokens.push(CmapToken::Hex(bytes));
            }
            '[' => tokens.push(CmapToken::ArrayStart),
            ']' => tokens.push(CmapToken::ArrayEnd),
            _ => {}
        }
    }
    tokens
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

fn utf16_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { u16::from_be_bytes([c[0], c[1]]) } else { u16::from(c[0]) })
        .collect();
    String::from_utf16_lossy(&units)
}

fn sections<'a>(cmap: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = cmap;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        let Some(stop) = body.find(end) else {
            break;
        };
        found.push(&body[..stop]);
        rest = &body[stop + end.len()..];
    }
    found
}

/// Liest `bfchar`- und `bfrange`-Abschnitte einer ToUnicode-CMap
pub fn parse_to_unicode(cmap: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();

    for section in sections(cmap, "beginbfchar", "endbfchar") {
        let tokens = cmap_tokens(section);
        for pair in tokens.chunks(2) {
            if let [CmapToken::Hex(src), CmapToken::Hex(dst)] = pair {
                map.insert(code_of(src), utf16_text(dst));
            }
        }
    }

    for section in sections(cmap, "beginbfrange", "endbfrange") {
        let tokens = cmap_tokens(section);
        let mut i = 0;
        while i + 2 < tokens.len() {
            let (CmapToken::Hex(lo), CmapToken::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
                i += 1;
                continue;
            };
            let (lo, hi) = (code_of(lo), code_of(hi));
            match &tokens[i + 2] {
                CmapToken::Hex(dst) => {
                    // Letzte UTF-16-Einheit wird pro Code hochgezählt
                    let mut dst = dst.clone();
                    for code in lo..=hi {
                        map.insert(code, utf16_text(&dst));
                        increment_last_unit(&mut dst);
                    }
                    i += 3;
                }
                CmapToken::ArrayStart => {
                    let mut j = i + 3;
                    let mut code = lo;
                    while j < tokens.len() && tokens[j] != CmapToken::ArrayEnd {
                        if let CmapToken::Hex(dst) = &tokens[j] {
                            if code <= hi {
                                map.insert(code, utf16_text(dst));
                            }
                            code += 1;
                        }
                        j += 1;
                    }
                    i = j + 1;
                }
                CmapToken::ArrayEnd => i += 3,
            }
        }
    }

    map
}

fn increment_last_unit(dst: &mut [u8]) {
    for byte in dst.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_standard_font_from_subset_name() {
        assert_eq!(
            StandardFont::from_base_font("ABCDEF+Arial-BoldMT"),
            Some(StandardFont::HelveticaBold)
        );
        assert_eq!(StandardFont::from_base_font("Helvetica"), Some(StandardFont::Helvetica));
        assert_eq!(StandardFont::from_base_font("Courier-Oblique"), Some(StandardFont::Courier));
        assert_eq!(StandardFont::from_base_font("TimesNewRomanPSMT"), Some(StandardFont::TimesRoman));
        assert_eq!(
            StandardFont::from_base_font("Times-BoldItalic"),
            Some(StandardFont::TimesBoldItalic)
        );
        assert_eq!(StandardFont::from_base_font("TimesNewRoman,Italic"), Some(StandardFont::TimesItalic));
        assert_eq!(StandardFont::from_base_font("Symbol"), None);
    }

    #[test]
    fn test_helvetica_widths() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.width(b' '), 278.0);
        assert_eq!(font.width(b'A'), 667.0);
        assert_eq!(font.width(b'm'), 833.0);
        assert_eq!(font.width(b'~'), 584.0);
        // 1000 Einheiten bei Größe 10 = 10pt
        assert!((StandardFont::Courier.text_width("ab", 10.0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_times_widths() {
        assert_eq!(StandardFont::TimesRoman.width(b'D'), 722.0);
        assert_eq!(StandardFont::TimesRoman.width(b' '), 250.0);
        assert_eq!(StandardFont::TimesBold.width(b'W'), 1000.0);
        assert_eq!(StandardFont::TimesItalic.width(b'm'), 722.0);
        assert_eq!(StandardFont::TimesBoldItalic.width(b'~'), 570.0);
        // "Date: " = 722+444+278+444+278+250
        assert!((StandardFont::TimesRoman.text_width("Date: ", 12.0) - 28.992).abs() < 1e-3);
    }

    #[test]
    fn test_times_without_widths_uses_builtin_metrics() {
        let doc = Document::with_version("1.5");
        let dict = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        };
        let font = PdfFont::from_dict(&doc, &dict);
        assert_eq!(font.width(u32::from(b'D')), 722.0);
        assert_eq!(font.width(u32::from(b'a')), 444.0);
    }

    #[test]
    fn test_win_ansi_roundtrip_for_umlauts() {
        let bytes = encode_win_ansi("Müller – €");
        assert_eq!(bytes, vec![b'M', 0xFC, b'l', b'l', b'e', b'r', b' ', 0x96, b' ', 0x80]);
        assert_eq!(decode_win_ansi(0xFC), 'ü');
        assert_eq!(decode_win_ansi(0x80), '€');
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_parse_bfchar_and_bfrange() {
        let cmap = "begincmap\n2 beginbfchar\n<0003> <0020>\n<0024> <0041>\nendbfchar\n\
                    1 beginbfrange\n<0044> <0046> <0061>\nendbfrange\n\
                    1 beginbfrange\n<0050> <0051> [<0058> <0059>]\nendbfrange\nendcmap";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&0x03).map(String::as_str), Some(" "));
        assert_eq!(map.get(&0x24).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x44).map(String::as_str), Some("a"));
        assert_eq!(map.get(&0x46).map(String::as_str), Some("c"));
        assert_eq!(map.get(&0x51).map(String::as_str), Some("Y"));
    }

    #[test]
    fn test_composite_codes_are_two_bytes() {
        let mut font = PdfFont::fallback();
        font.composite = true;
        font.default_width = 1000.0;
        font.cid_widths.insert(0x24, 667.0);
        let codes = font.codes(&[0x00, 0x24, 0x00, 0x25]);
        assert_eq!(codes, vec![(0x24, 0..2), (0x25, 2..4)]);
        assert_eq!(font.width(0x24), 667.0);
        assert_eq!(font.width(0x25), 1000.0);
    }
}
