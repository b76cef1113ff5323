use crate::error::Result;
use crate::pdf::document::PageEditor;
use crate::pdf::font::StandardFont;
use crate::pdf::geometry::{Point, Rect, Rgb};
use crate::pdf::text::TextMatch;
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::Serialize;

/// Wie der Platzhalter verschwindet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseMode {
    /// Deckendes Rechteck über dem Platzhalter
    #[default]
    Overdraw,
    /// Glyphen werden aus dem Inhaltsstrom entfernt
    Redact,
}

/// Schriftgröße des Ersatztextes
#[derive(Debug, Clone, PartialEq)]
pub enum FontSizing {
    Fixed(f32),
    /// Höhe der Platzhalter-Box
    Placeholder,
    /// Höhe der Box einer Referenzphrase auf derselben Seite
    Reference(String),
}

impl Default for FontSizing {
    fn default() -> Self {
        FontSizing::Fixed(12.0)
    }
}

/// Ein Platzhalter und sein Ersatz
#[derive(Debug, Clone)]
pub struct Replacement {
    pub placeholder: String,
    pub value: String,
    pub font: StandardFont,
    pub color: Rgb,
    pub dx: f32,
    pub dy: f32,
}

impl Replacement {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>, font: StandardFont) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
            font,
            color: Rgb::BLACK,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_offset(mut self, dx: f32, dy: f32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }
}

/// Was für einen Platzhalter passiert ist
#[derive(Debug, Clone, Serialize)]
pub struct ReplacementReport {
    pub placeholder: String,
    pub matches: Vec<Rect>,
    /// Einfügepunkte des Ersatztextes, einer pro Fundstelle
    pub origins: Vec<Point>,
    pub font_size: Option<f32>,
}

impl ReplacementReport {
    pub fn found(&self) -> bool {
        !self.matches.is_empty()
    }
}

pub struct PlaceholderReplacer {
    erase: EraseMode,
    sizing: FontSizing,
    background: Rgb,
}

impl PlaceholderReplacer {
    pub fn new(erase: EraseMode, sizing: FontSizing) -> Self {
        Self {
            erase,
            sizing,
            background: Rgb::WHITE,
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Höhe der Referenzphrase, `None` wenn nicht verwendet oder nicht gefunden
    fn reference_size(&self, page: &PageEditor) -> Option<f32> {
        let FontSizing::Reference(phrase) = &self.sizing else {
            return None;
        };
        match page.search_for(phrase).first() {
            Some(found) => {
                debug!("Reference phrase '{}' is {:.2} pt high", phrase, found.rect.height());
                Some(found.rect.height())
            }
            None => {
                warn!(
                    "✗ Reference phrase '{}' not found, sizing from the placeholder instead",
                    phrase
                );
                None
            }
        }
    }

    fn font_size(&self, found: &TextMatch, reference: Option<f32>) -> f32 {
        match &self.sizing {
            FontSizing::Fixed(size) => *size,
            FontSizing::Placeholder => found.rect.height(),
            FontSizing::Reference(_) => reference.unwrap_or_else(|| found.rect.height()),
        }
    }

    /// Ersetzt alle Platzhalter auf der Seite
    ///
    /// Alle Fundstellen werden vor dem ersten Eingriff gesucht, damit die
    /// Schwärzung auf den unveränderten Operationen arbeitet.
    pub fn replace_all(
        &self,
        page: &mut PageEditor,
        replacements: &[Replacement],
    ) -> Result<Vec<ReplacementReport>> {
        info!(
            "Starting replacements on page {}. Total placeholders: {}",
            page.page_index(),
            replacements.len()
        );

        let layout = page.layout();
        let located: Vec<Vec<TextMatch>> = replacements
            .iter()
            .map(|r| layout.search_for(&r.placeholder))
            .collect();
        let reference = self.reference_size(page);

        match self.erase {
            EraseMode::Redact => {
                let all: Vec<TextMatch> = located.iter().flatten().cloned().collect();
                page.redact(&all);
            }
            EraseMode::Overdraw => {
                for found in located.iter().flatten() {
                    page.fill_rect(found.rect, self.background);
                }
            }
        }

        let mut reports = Vec::with_capacity(replacements.len());
        for (replacement, matches) in replacements.iter().zip(located) {
            if matches.is_empty() {
                warn!("✗ Placeholder '{}' not found in document", replacement.placeholder);
                reports.push(ReplacementReport {
                    placeholder: replacement.placeholder.clone(),
                    matches: Vec::new(),
                    origins: Vec::new(),
                    font_size: None,
                });
                continue;
            }

            info!(
                "✓ Replacing {} occurrences of '{}' with '{}'",
                matches.len(),
                replacement.placeholder,
                replacement.value
            );

            let mut origins = Vec::with_capacity(matches.len());
            let mut size = None;
            for found in &matches {
                let font_size = self.font_size(found, reference);
                let origin = found.origin();
                let origin = Point::new(origin.x + replacement.dx, origin.y + replacement.dy);
                page.draw_text(
                    &replacement.value,
                    origin,
                    replacement.font,
                    font_size,
                    replacement.color,
                )?;
                origins.push(origin);
                size = Some(font_size);
            }

            reports.push(ReplacementReport {
                placeholder: replacement.placeholder.clone(),
                matches: matches.iter().map(|m| m.rect).collect(),
                origins,
                font_size: size,
            });
        }

        Ok(reports)
    }
}

impl Default for PlaceholderReplacer {
    fn default() -> Self {
        Self::new(EraseMode::default(), FontSizing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::TemplateDocument;
    use crate::template::sample;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    fn template() -> TemplateDocument {
        TemplateDocument::from_bytes(sample::build_template().unwrap()).unwrap()
    }

    /// Einseitiges PDF mit `text` in Helvetica 12 bei (100, 500)
    fn one_line_page(text: &str) -> TemplateDocument {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 500.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 842.into(), 595.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        TemplateDocument::from_bytes(bytes).unwrap()
    }

    fn date(value: &str) -> Replacement {
        Replacement::new(sample::DATE_PLACEHOLDER, value, StandardFont::Helvetica)
    }

    fn name(value: &str) -> Replacement {
        Replacement::new(sample::NAME_PLACEHOLDER, value, StandardFont::HelveticaBold)
    }

    #[test]
    fn test_origin_is_left_edge_and_baseline() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();
        let placeholder = page.search_for(sample::NAME_PLACEHOLDER)[0].clone();

        let reports = PlaceholderReplacer::default()
            .replace_all(&mut page, &[name("Max Mustermann")])
            .unwrap();

        assert_eq!(reports[0].origins.len(), 1);
        assert!((reports[0].origins[0].x - placeholder.rect.x0).abs() < 1e-3);
        assert!((reports[0].origins[0].y - placeholder.baseline).abs() < 1e-3);
        assert_eq!(reports[0].font_size, Some(12.0));
    }

    #[test]
    fn test_offsets_shift_origin() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();
        let placeholder = page.search_for(sample::NAME_PLACEHOLDER)[0].clone();

        let reports = PlaceholderReplacer::default()
            .replace_all(&mut page, &[name("Max").with_offset(5.0, -2.0)])
            .unwrap();
        assert!((reports[0].origins[0].x - (placeholder.rect.x0 + 5.0)).abs() < 1e-3);
        assert!((reports[0].origins[0].y - (placeholder.baseline - 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_missing_placeholder_is_reported_not_fatal() {
        let template = template();
        let mut page = template.edit_page(0).unwrap();

        let reports = PlaceholderReplacer::default()
            .replace_all(&mut page, &[name("Max")])
            .unwrap();
        assert!(!reports[0].found());
        assert!(reports[0].origins.is_empty());
    }

    #[test]
    fn test_redact_removes_placeholder_and_keeps_neighbours() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();
        let date_label = page.search_for("Date:")[0].rect;

        let replacer = PlaceholderReplacer::new(EraseMode::Redact, FontSizing::Placeholder);
        replacer
            .replace_all(
                &mut page,
                &[Replacement::new(sample::DATE_PLACEHOLDER, "01-Feb-2025", StandardFont::Helvetica)],
            )
            .unwrap();

        let reopened = TemplateDocument::from_bytes(page.finish().unwrap()).unwrap();
        let page = reopened.edit_page(0).unwrap();

        assert!(page.search_for(sample::DATE_PLACEHOLDER).is_empty());
        let after = page.search_for("Date:")[0].rect;
        assert!((after.x0 - date_label.x0).abs() < 1e-3);
        assert!((after.y0 - date_label.y0).abs() < 1e-3);
        assert_eq!(page.search_for("01-Feb-2025").len(), 1);
    }

    #[test]
    fn test_every_match_is_replaced() {
        let template = one_line_page("DD-MMM-YYYY to DD-MMM-YYYY");
        let mut page = template.edit_page(0).unwrap();
        let placeholders = page.search_for(sample::DATE_PLACEHOLDER);
        assert_eq!(placeholders.len(), 2);

        let reports = PlaceholderReplacer::default()
            .replace_all(&mut page, &[date("01-Feb-2025")])
            .unwrap();
        assert_eq!(reports[0].matches.len(), 2);
        for (origin, placeholder) in reports[0].origins.iter().zip(&placeholders) {
            assert!((origin.x - placeholder.rect.x0).abs() < 1e-3);
            assert!((origin.y - placeholder.baseline).abs() < 1e-3);
        }

        let reopened = TemplateDocument::from_bytes(page.finish().unwrap()).unwrap();
        let drawn = reopened.edit_page(0).unwrap().search_for("01-Feb-2025");
        assert_eq!(drawn.len(), 2);
        assert!((drawn[0].rect.x0 - placeholders[0].rect.x0).abs() < 1e-2);
        assert!((drawn[1].rect.x0 - placeholders[1].rect.x0).abs() < 1e-2);
    }

    #[test]
    fn test_redact_removes_every_match_in_one_string() {
        let template = one_line_page("DD-MMM-YYYY to DD-MMM-YYYY");
        let mut page = template.edit_page(0).unwrap();
        let between = page.search_for("to")[0].rect;

        let replacer = PlaceholderReplacer::new(EraseMode::Redact, FontSizing::Placeholder);
        let reports = replacer.replace_all(&mut page, &[date("01-Feb-2025")]).unwrap();
        assert_eq!(reports[0].origins.len(), 2);

        let reopened = TemplateDocument::from_bytes(page.finish().unwrap()).unwrap();
        let page = reopened.edit_page(0).unwrap();
        assert!(page.search_for(sample::DATE_PLACEHOLDER).is_empty());
        assert_eq!(page.search_for("01-Feb-2025").len(), 2);

        let after = page.search_for("to")[0].rect;
        assert!((after.x0 - between.x0).abs() < 1e-3);
        assert!((after.y0 - between.y0).abs() < 1e-3);
    }

    #[test]
    fn test_overdraw_keeps_original_text_in_stream() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();

        PlaceholderReplacer::default()
            .replace_all(&mut page, &[name("Max")])
            .unwrap();
        // Nur verdeckt, nicht entfernt
        assert_eq!(page.search_for(sample::NAME_PLACEHOLDER).len(), 1);
    }

    #[test]
    fn test_reference_sizing_uses_phrase_height() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();
        let phrase_height = page.search_for(sample::REFERENCE_PHRASE)[0].rect.height();

        let replacer = PlaceholderReplacer::new(
            EraseMode::Overdraw,
            FontSizing::Reference(sample::REFERENCE_PHRASE.to_string()),
        );
        let reports = replacer.replace_all(&mut page, &[name("Max")]).unwrap();
        assert!((reports[0].font_size.unwrap() - phrase_height).abs() < 1e-3);
    }

    #[test]
    fn test_reference_sizing_falls_back_to_placeholder() {
        let template = template();
        let mut page = template.edit_page(3).unwrap();
        let placeholder_height = page.search_for(sample::NAME_PLACEHOLDER)[0].rect.height();

        let replacer = PlaceholderReplacer::new(
            EraseMode::Overdraw,
            FontSizing::Reference("no such phrase".to_string()),
        );
        let reports = replacer.replace_all(&mut page, &[name("Max")]).unwrap();
        assert!((reports[0].font_size.unwrap() - placeholder_height).abs() < 1e-3);
    }
}
