pub mod document;
pub mod font;
pub mod geometry;
pub mod redact;
pub mod replacer;
pub mod signature;
pub mod text;

pub use document::{PageEditor, TemplateDocument};
pub use font::StandardFont;
pub use geometry::{Matrix, Point, Rect, Rgb};
pub use replacer::{EraseMode, FontSizing, PlaceholderReplacer, Replacement, ReplacementReport};
pub use signature::{RasterImage, SignatureGeometry, SignatureLayout, SignatureSlot, SignatureStamper};
pub use text::{GlyphSpan, TextLayout, TextMatch};

use lopdf::{Document, Object};

/// Folgt indirekten Referenzen bis zum eigentlichen Objekt
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    // Begrenzt, damit zyklische Referenzen nicht endlos laufen
    for _ in 0..16 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
