//! Koordinaten-Primitive im PDF-Benutzerraum (Ursprung unten links, y nach oben).

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CertError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Achsenparalleles Rechteck, `x0/y0` ist immer die linke untere Ecke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Kleinstes Rechteck, das alle Punkte enthält
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Größtes Rechteck mit dem Seitenverhältnis `width:height`, zentriert in `self`
    pub fn fit_aspect(&self, width: f32, height: f32) -> Rect {
        if width <= 0.0 || height <= 0.0 || self.width() <= 0.0 || self.height() <= 0.0 {
            return *self;
        }
        let scale = (self.width() / width).min(self.height() / height);
        let w = width * scale;
        let h = height * scale;
        let x = self.x0 + (self.width() - w) / 2.0;
        let y = self.y0 + (self.height() - h) / 2.0;
        Rect::from_size(x, y, w, h)
    }
}

/// Affine Transformation `[a b c d e f]` in PDF-Konvention (Zeilenvektor mal Matrix).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: erst `self`, dann `other` anwenden
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// RGB-Farbe mit Komponenten im Bereich 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    /// Parst `#RRGGBB` bzw. `RRGGBB`, wie es Farbwähler liefern
    pub fn from_hex(input: &str) -> Option<Rgb> {
        static HEX: OnceLock<Regex> = OnceLock::new();
        let re = HEX.get_or_init(|| {
            Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
                .expect("color pattern is valid")
        });

        let caps = re.captures(input.trim())?;
        let channel = |i: usize| {
            u8::from_str_radix(&caps[i], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Rgb {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
        })
    }
}

impl FromStr for Rgb {
    type Err = CertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s).ok_or_else(|| CertError::InvalidColor(s.to_string()))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(10.0, 20.0, 5.0, 2.0);
        assert_eq!(r, Rect::new(5.0, 2.0, 10.0, 20.0));
        assert_eq!(r.width(), 5.0);
        assert_eq!(r.height(), 18.0);
    }

    #[test]
    fn test_fit_aspect_keeps_ratio_and_centers() {
        let slot = Rect::from_size(0.0, 0.0, 200.0, 50.0);
        let fitted = slot.fit_aspect(400.0, 200.0);
        assert!((fitted.height() - 50.0).abs() < 1e-3);
        assert!((fitted.width() - 100.0).abs() < 1e-3);
        assert!((fitted.center_x() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_matrix_translation_then_scale() {
        let m = Matrix::translation(10.0, 0.0).multiply(&Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        let p = m.apply(1.0, 1.0);
        assert_eq!(p, Point::new(22.0, 2.0));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Rgb::from_hex("#FFFFFF"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("000000"), Some(Rgb::BLACK));
        let red = Rgb::from_hex("#ff0000").unwrap();
        assert_eq!(red.r, 1.0);
        assert_eq!(red.g, 0.0);
        assert!(Rgb::from_hex("#12345").is_none());
        assert!(Rgb::from_hex("blue").is_none());
        assert!(matches!("blue".parse::<Rgb>(), Err(CertError::InvalidColor(c)) if c == "blue"));
    }
}
