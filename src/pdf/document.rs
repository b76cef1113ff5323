use crate::error::{CertError, Result};
use crate::pdf::font::{encode_win_ansi, PdfFont, StandardFont};
use crate::pdf::geometry::{Point, Rect, Rgb};
use crate::pdf::redact::remove_glyphs;
use crate::pdf::signature::RasterImage;
use crate::pdf::text::{TextLayout, TextMatch};
use crate::pdf::{number, resolve};
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Attribute, die eine Seite von ihren `Pages`-Knoten erben kann
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Repräsentiert die Zertifikatsvorlage
pub struct TemplateDocument {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    page_count: usize,
}

impl TemplateDocument {
    /// Öffnet die Vorlage von der Platte
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CertError::TemplateNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let mut template = Self::from_bytes(bytes)?;
        template.path = Some(path.to_path_buf());
        info!(
            "Loaded template {} ({} pages)",
            path.display(),
            template.page_count
        );
        Ok(template)
    }

    /// Vorlage aus dem Speicher, z.B. hochgeladen oder generiert
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let doc = Document::load_mem(&bytes)?;
        let page_count = doc.get_pages().len();
        Ok(Self {
            path: None,
            bytes,
            page_count,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Lädt eine frische Kopie und öffnet die Seite `index` (0-basiert) zum Bearbeiten
    pub fn edit_page(&self, index: usize) -> Result<PageEditor> {
        if index >= self.page_count {
            return Err(CertError::PageOutOfRange {
                page: index,
                total: self.page_count,
            });
        }
        let doc = Document::load_mem(&self.bytes)?;
        PageEditor::new(doc, index)
    }
}

/// Bearbeitet genau eine Seite und exportiert sie als einseitiges PDF
pub struct PageEditor {
    doc: Document,
    page_id: ObjectId,
    page_index: usize,
    media_box: Rect,
    operations: Vec<Operation>,
    fonts: HashMap<Vec<u8>, PdfFont>,
    overlay: Vec<Operation>,
    standard_fonts: HashMap<StandardFont, Vec<u8>>,
    modified: bool,
}

impl PageEditor {
    pub fn new(mut doc: Document, page_index: usize) -> Result<Self> {
        let pages = doc.get_pages();
        let page_id = *pages
            .get(&(page_index as u32 + 1))
            .ok_or(CertError::PageOutOfRange {
                page: page_index,
                total: pages.len(),
            })?;

        inherit_attributes(&mut doc, page_id)?;
        inline_resources(&mut doc, page_id)?;

        let media_box = media_box(&doc, page_id);
        let content = doc.get_page_content(page_id)?;
        let operations = Content::decode(&content)?.operations;
        let fonts = load_fonts(&doc, page_id)?;

        debug!(
            "Page {}: {} operations, {} fonts, media box {:?}",
            page_index,
            operations.len(),
            fonts.len(),
            media_box
        );

        Ok(Self {
            doc,
            page_id,
            page_index,
            media_box,
            operations,
            fonts,
            overlay: Vec::new(),
            standard_fonts: HashMap::new(),
            modified: false,
        })
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn media_box(&self) -> Rect {
        self.media_box
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn layout(&self) -> TextLayout {
        TextLayout::from_operations(&self.operations, &self.fonts)
    }

    pub fn search_for(&self, needle: &str) -> Vec<TextMatch> {
        self.layout().search_for(needle)
    }

    /// Entfernt die Glyphen der Fundstellen aus dem Inhaltsstrom
    pub fn redact(&mut self, matches: &[TextMatch]) {
        let spans: Vec<_> = matches.iter().flat_map(|m| m.spans.iter().cloned()).collect();
        if spans.is_empty() {
            return;
        }
        self.operations = remove_glyphs(&self.operations, &spans);
        self.modified = true;
    }

    /// Deckende Fläche über dem Originalinhalt
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.overlay.extend([
            Operation::new("q", vec![]),
            color_op(color),
            Operation::new(
                "re",
                vec![
                    Object::Real(rect.x0),
                    Object::Real(rect.y0),
                    Object::Real(rect.width()),
                    Object::Real(rect.height()),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.modified = true;
    }

    /// Schreibt `text` mit der Grundlinie bei `origin`
    pub fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font: StandardFont,
        size: f32,
        color: Rgb,
    ) -> Result<()> {
        let font_name = self.standard_font_resource(font)?;
        self.overlay.extend([
            Operation::new("q", vec![]),
            color_op(color),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font_name), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(origin.x), Object::Real(origin.y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.modified = true;
        Ok(())
    }

    /// Bettet ein Bild ein und skaliert es auf `rect`
    pub fn draw_image(&mut self, image: &RasterImage, rect: Rect) -> Result<()> {
        let smask_id = image.alpha.as_ref().map(|alpha| {
            self.doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8_i64,
                },
                alpha.clone(),
            ))
        });

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };
        if let Some(id) = smask_id {
            image_dict.set("SMask", Object::Reference(id));
        }
        let image_id = self.doc.add_object(Stream::new(image_dict, image.rgb.clone()));
        let name = self.add_resource(b"XObject", "CfSig", Object::Reference(image_id))?;

        self.overlay.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(rect.width()),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(rect.height()),
                    Object::Real(rect.x0),
                    Object::Real(rect.y0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name)]),
            Operation::new("Q", vec![]),
        ]);
        self.modified = true;
        Ok(())
    }

    /// Schreibt den Inhalt zurück, verwirft alle anderen Seiten und serialisiert
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.modified {
            let mut operations = Vec::with_capacity(self.operations.len() + self.overlay.len() + 2);
            operations.push(Operation::new("q", vec![]));
            operations.append(&mut self.operations);
            operations.push(Operation::new("Q", vec![]));
            operations.append(&mut self.overlay);

            let content = Content { operations }.encode()?;
            let stream_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
            self.doc
                .get_object_mut(self.page_id)?
                .as_dict_mut()?
                .set("Contents", Object::Reference(stream_id));
        }

        let target = self.page_index as u32 + 1;
        let others: Vec<u32> = self
            .doc
            .get_pages()
            .keys()
            .copied()
            .filter(|n| *n != target)
            .collect();
        if !others.is_empty() {
            self.doc.delete_pages(&others);
        }
        self.doc.prune_objects();
        self.doc.compress();

        let mut output = Vec::new();
        self.doc.save_to(&mut output)?;
        debug!("Serialized page {} ({} bytes)", self.page_index, output.len());
        Ok(output)
    }

    fn standard_font_resource(&mut self, font: StandardFont) -> Result<Vec<u8>> {
        if let Some(name) = self.standard_fonts.get(&font) {
            return Ok(name.clone());
        }
        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let name = self.add_resource(b"Font", "CfFont", Object::Reference(font_id))?;
        self.standard_fonts.insert(font, name.clone());
        Ok(name)
    }

    /// Trägt `value` unter einem freien Namen in die Ressourcenkategorie ein
    fn add_resource(&mut self, category: &[u8], prefix: &str, value: Object) -> Result<Vec<u8>> {
        let page = self.doc.get_object_mut(self.page_id)?.as_dict_mut()?;
        if !page.has(b"Resources") {
            page.set("Resources", Dictionary::new());
        }
        let resources = page.get_mut(b"Resources")?.as_dict_mut()?;
        if !matches!(resources.get(category), Ok(Object::Dictionary(_))) {
            resources.set(category.to_vec(), Dictionary::new());
        }
        let entries = resources.get_mut(category)?.as_dict_mut()?;

        let mut n = 0;
        let name = loop {
            let candidate = format!("{}{}", prefix, n);
            if !entries.has(candidate.as_bytes()) {
                break candidate.into_bytes();
            }
            n += 1;
        };
        entries.set(name.clone(), value);
        Ok(name)
    }
}

fn color_op(color: Rgb) -> Operation {
    Operation::new(
        "rg",
        vec![
            Object::Real(color.r),
            Object::Real(color.g),
            Object::Real(color.b),
        ],
    )
}

fn parent_of(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .ok()?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .ok()
}

/// Kopiert geerbte Attribute auf die Seite, bevor die Elternknoten wegfallen
fn inherit_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }
            let mut current = parent_of(doc, page_id);
            let mut depth = 0;
            while let (Some(id), true) = (current, depth < 32) {
                if let Ok(value) = doc.get_dictionary(id).and_then(|node| node.get(key)) {
                    inherited.push((key.to_vec(), value.clone()));
                    break;
                }
                current = parent_of(doc, id);
                depth += 1;
            }
        }
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// Legt `Resources` sowie `Font`/`XObject` direkt in die Seite, damit wir sie
/// ändern können, ohne geteilte Objekte anzufassen
fn inline_resources(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let resources = {
        let page = doc.get_dictionary(page_id)?;
        let mut resources = match page.get(b"Resources").map(|o| resolve(doc, o)) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        for category in [b"Font".as_slice(), b"XObject".as_slice()] {
            let resolved = match resources.get(category).map(|o| resolve(doc, o)) {
                Ok(Object::Dictionary(dict)) => Some(dict.clone()),
                _ => None,
            };
            if let Some(dict) = resolved {
                resources.set(category.to_vec(), dict);
            }
        }
        resources
    };

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", resources);
    Ok(())
}

fn load_fonts(doc: &Document, page_id: ObjectId) -> Result<HashMap<Vec<u8>, PdfFont>> {
    let page = doc.get_dictionary(page_id)?;
    let mut fonts = HashMap::new();
    if let Ok(Object::Dictionary(resources)) = page.get(b"Resources") {
        if let Ok(Object::Dictionary(entries)) = resources.get(b"Font") {
            for (name, obj) in entries.iter() {
                if let Object::Dictionary(dict) = resolve(doc, obj) {
                    fonts.insert(name.clone(), PdfFont::from_dict(doc, dict));
                }
            }
        }
    }
    Ok(fonts)
}

fn media_box(doc: &Document, page_id: ObjectId) -> Rect {
    let values: Vec<f32> = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .map(|obj| match resolve(doc, obj) {
            Object::Array(items) => items.iter().filter_map(|o| number(resolve(doc, o))).collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default();

    match values[..] {
        [x0, y0, x1, y1] => Rect::new(x0, y0, x1, y1),
        // US Letter, wenn nichts angegeben ist
        _ => Rect::new(0.0, 0.0, 612.0, 792.0),
    }
}
