use crate::error::Result;
use crate::pdf::document::PageEditor;
use crate::pdf::font::StandardFont;
use crate::pdf::geometry::{Point, Rect, Rgb};
use crate::template::Roster;
use log::{info, warn};

/// Dekodiertes Unterschriftsbild, aufgeteilt in RGB und Alphakanal
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    /// `None`, wenn das Bild vollständig deckend ist
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    /// PNG oder JPEG aus dem Speicher
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in img.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        let opaque = alpha.iter().all(|a| *a == u8::MAX);

        Ok(Self {
            width,
            height,
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        })
    }
}

/// Wo die Unterschriften einer Variante hinkommen
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureLayout {
    None,
    /// Eine Unterschrift, horizontal zentriert
    Centered,
    /// Ersteller links, fester Mitunterzeichner rechts
    Split { co_signer: Option<String> },
    /// Feste Position der linken unteren Ecke
    Absolute { x: f32, y: f32 },
    /// Relativ zum bereits gedruckten Namen des Erstellers
    Anchored { dx: f32, dy: f32 },
}

impl SignatureLayout {
    pub fn kind(&self) -> &'static str {
        match self {
            SignatureLayout::None => "none",
            SignatureLayout::Centered => "centered",
            SignatureLayout::Split { .. } => "split",
            SignatureLayout::Absolute { .. } => "absolute",
            SignatureLayout::Anchored { .. } => "anchored",
        }
    }
}

/// Größe und Lage der Unterschriftsfelder, per CLI kalibrierbar
#[derive(Debug, Clone)]
pub struct SignatureGeometry {
    pub width: f32,
    pub height: f32,
    /// Unterkante der Felder bei `Centered` und `Split`, ab Unterkante der MediaBox
    pub y: f32,
    pub left_fraction: f32,
    pub right_fraction: f32,
    pub draw_labels: bool,
    pub name_size: f32,
    pub title_size: f32,
    pub label_color: Rgb,
}

impl Default for SignatureGeometry {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 50.0,
            y: 110.0,
            left_fraction: 0.25,
            right_fraction: 0.75,
            draw_labels: true,
            name_size: 11.0,
            title_size: 9.0,
            label_color: Rgb::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureSlot {
    pub signer: String,
    pub rect: Rect,
}

pub struct SignatureStamper<'a> {
    roster: &'a Roster,
    geometry: SignatureGeometry,
}

impl<'a> SignatureStamper<'a> {
    pub fn new(roster: &'a Roster, geometry: SignatureGeometry) -> Self {
        Self { roster, geometry }
    }

    fn slot_at(&self, signer: &str, center_x: f32, media: &Rect) -> SignatureSlot {
        let g = &self.geometry;
        SignatureSlot {
            signer: signer.to_string(),
            rect: Rect::from_size(center_x - g.width / 2.0, media.y0 + g.y, g.width, g.height),
        }
    }

    /// Berechnet die Felder, ohne etwas zu zeichnen
    pub fn plan(&self, page: &PageEditor, layout: &SignatureLayout, creator: &str) -> Vec<SignatureSlot> {
        let g = &self.geometry;
        let media = page.media_box();
        let at_fraction = |fraction: f32| media.x0 + media.width() * fraction;

        match layout {
            SignatureLayout::None => Vec::new(),
            SignatureLayout::Centered => vec![self.slot_at(creator, media.center_x(), &media)],
            SignatureLayout::Split { co_signer } => match co_signer.as_deref() {
                Some(co) if co != creator => vec![
                    self.slot_at(creator, at_fraction(g.left_fraction), &media),
                    self.slot_at(co, at_fraction(g.right_fraction), &media),
                ],
                Some(_) => {
                    info!("Creator is also the co-signer, using a single centered signature");
                    vec![self.slot_at(creator, media.center_x(), &media)]
                }
                None => {
                    warn!("No co-signer configured, using a single centered signature");
                    vec![self.slot_at(creator, media.center_x(), &media)]
                }
            },
            SignatureLayout::Absolute { x, y } => vec![SignatureSlot {
                signer: creator.to_string(),
                rect: Rect::from_size(*x, *y, g.width, g.height),
            }],
            SignatureLayout::Anchored { dx, dy } => match page.search_for(creator).first() {
                Some(anchor) => vec![SignatureSlot {
                    signer: creator.to_string(),
                    rect: Rect::from_size(
                        anchor.rect.center_x() - g.width / 2.0 + dx,
                        anchor.rect.y1 + dy,
                        g.width,
                        g.height,
                    ),
                }],
                None => {
                    warn!("✗ Anchor text '{}' not found, no signature placed", creator);
                    Vec::new()
                }
            },
        }
    }

    /// Zeichnet Bild und Beschriftung für jedes Feld
    pub fn stamp(
        &self,
        page: &mut PageEditor,
        layout: &SignatureLayout,
        creator: &str,
    ) -> Result<Vec<SignatureSlot>> {
        let slots = self.plan(page, layout, creator);
        // Beim verankerten Layout stehen Name und Titel schon in der Vorlage
        let labels = self.geometry.draw_labels && !matches!(layout, SignatureLayout::Anchored { .. });

        for slot in &slots {
            let signer = self.roster.get(&slot.signer)?;

            if let Some(image) = self.roster.signature_image(&slot.signer)? {
                let target = slot.rect.fit_aspect(image.width as f32, image.height as f32);
                page.draw_image(&image, target)?;
            } else {
                warn!("Signer '{}' has no signature image, drawing labels only", slot.signer);
            }

            if labels {
                let g = &self.geometry;
                let name_y = slot.rect.y0 - g.name_size;
                self.draw_centered(page, &slot.signer, slot.rect.center_x(), name_y, StandardFont::HelveticaBold, g.name_size)?;
                if !signer.title.is_empty() {
                    let title_y = name_y - g.title_size * 1.4;
                    self.draw_centered(page, &signer.title, slot.rect.center_x(), title_y, StandardFont::Helvetica, g.title_size)?;
                }
            }

            info!("✓ Placed signature of '{}' at {:?}", slot.signer, slot.rect);
        }

        Ok(slots)
    }

    fn draw_centered(
        &self,
        page: &mut PageEditor,
        text: &str,
        center_x: f32,
        baseline: f32,
        font: StandardFont,
        size: f32,
    ) -> Result<()> {
        let x = center_x - font.text_width(text, size) / 2.0;
        page.draw_text(text, Point::new(x, baseline), font, size, self.geometry.label_color)
    }
}
