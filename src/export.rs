//! Einzel-PDF, Batch-ZIP und PNG-Vorschau.

use crate::error::{CertError, Result};
use crate::pdf::{
    PlaceholderReplacer, Rect, ReplacementReport, SignatureLayout, SignatureSlot,
    SignatureStamper, TemplateDocument,
};
use crate::template::data::{DATE_PLACEHOLDER, NAME_PLACEHOLDER};
use crate::template::{CertificateRequest, RenderOptions, Roster, TemplateVariant};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Auflösung der Vorschau
pub const PREVIEW_DPI: f32 = 150.0;

/// Ein fertiges Zertifikat im Speicher
#[derive(Debug, Clone)]
pub struct Certificate {
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub replacements: Vec<ReplacementReport>,
    pub signatures: Vec<SignatureSlot>,
}

/// ZIP-Archiv eines Batch-Laufs
#[derive(Debug, Clone)]
pub struct BatchArchive {
    pub bytes: Vec<u8>,
    pub entries: Vec<String>,
}

pub struct CertificateGenerator<'a> {
    template: &'a TemplateDocument,
    roster: &'a Roster,
    options: RenderOptions,
}

impl<'a> CertificateGenerator<'a> {
    pub fn new(template: &'a TemplateDocument, roster: &'a Roster, options: RenderOptions) -> Self {
        Self {
            template,
            roster,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Komplette Kette für ein Zertifikat
    pub fn generate(&self, request: &CertificateRequest) -> Result<Certificate> {
        let variant = request.variant;
        info!("Generating certificate for '{}' ({})", request.name, variant);

        let mut page = self.template.edit_page(variant.page_index())?;

        let replacer = PlaceholderReplacer::new(self.options.erase, self.options.font_sizing(variant))
            .with_background(self.options.background);
        let replacements = replacer.replace_all(&mut page, &request.to_replacements(&self.options))?;

        let layout = self.options.signature_layout(variant, self.roster.co_signer());
        let signatures = match (&request.creator, &layout) {
            (_, SignatureLayout::None) => Vec::new(),
            (Some(creator), layout) => {
                SignatureStamper::new(self.roster, self.options.signature.clone())
                    .stamp(&mut page, layout, creator)?
            }
            (None, _) => {
                warn!("No creator given, certificate is left unsigned");
                Vec::new()
            }
        };

        let pdf = page.finish()?;
        debug!("Certificate for '{}' has {} bytes", request.name, pdf.len());

        Ok(Certificate {
            file_name: request.output_file_name(),
            pdf,
            replacements,
            signatures,
        })
    }

    /// Ein Zertifikat pro Name, alle in einem ZIP
    pub fn generate_batch(&self, names: &[String], base: &CertificateRequest) -> Result<BatchArchive> {
        if names.is_empty() {
            return Err(CertError::NoNames);
        }

        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut taken = HashSet::new();
        let mut entries = Vec::with_capacity(names.len());

        for (idx, name) in names.iter().enumerate() {
            let request = CertificateRequest {
                name: name.clone(),
                ..base.clone()
            };
            let certificate = self.generate(&request)?;
            let entry = unique_entry_name(&certificate.file_name, &mut taken);

            archive.start_file(entry.as_str(), options)?;
            archive.write_all(&certificate.pdf)?;
            info!("Created [{}] -> {}", idx, entry);
            entries.push(entry);
        }

        let bytes = archive.finish()?.into_inner();
        Ok(BatchArchive { bytes, entries })
    }
}

/// Hängt `_2`, `_3`, ... an, wenn der Name schon vergeben ist
fn unique_entry_name(file_name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(file_name.to_string()) {
        return file_name.to_string();
    }
    let stem = file_name.strip_suffix(".pdf").unwrap_or(file_name);
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}.pdf", stem, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Ein Name pro nicht-leerer Zeile
pub fn parse_names(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fundstellen eines Suchtextes auf einer Variantenseite
#[derive(Debug, Clone, Serialize)]
pub struct LocatedText {
    pub text: String,
    pub rects: Vec<Rect>,
    pub baselines: Vec<f32>,
}

/// Sucht Platzhalter, Referenzphrase und `extra` auf der Seite der Variante
pub fn locate_placeholders(
    template: &TemplateDocument,
    variant: TemplateVariant,
    extra: &[&str],
) -> Result<Vec<LocatedText>> {
    let page = template.edit_page(variant.page_index())?;
    let layout = page.layout();

    let needles = [NAME_PLACEHOLDER, DATE_PLACEHOLDER, variant.reference_phrase()]
        .into_iter()
        .chain(extra.iter().copied());

    Ok(needles
        .map(|needle| {
            let found = layout.search_for(needle);
            LocatedText {
                text: needle.to_string(),
                rects: found.iter().map(|m| m.rect).collect(),
                baselines: found.iter().map(|m| m.baseline).collect(),
            }
        })
        .collect())
}

/// Schlägt fehl, wenn die Vorschau nicht einkompiliert ist
pub fn ensure_preview_support() -> Result<()> {
    if cfg!(feature = "preview") {
        Ok(())
    } else {
        Err(CertError::Preview(
            "certfill was built without the `preview` feature".to_string(),
        ))
    }
}

/// Rendert die erste Seite als PNG
#[cfg(feature = "preview")]
pub fn render_preview(pdf: &[u8], dpi: f32) -> Result<Vec<u8>> {
    use image::{DynamicImage, ImageOutputFormat, RgbaImage};
    use pdfium_render::prelude::*;

    let failed = |e: PdfiumError| CertError::Preview(e.to_string());

    let bindings = Pdfium::bind_to_system_library().map_err(failed)?;
    let pdfium = Pdfium::new(bindings);
    let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(failed)?;
    let page = document.pages().get(0).map_err(failed)?;

    let scale = dpi / 72.0;
    let width = (page.width().value * scale).round() as i32;
    let height = (page.height().value * scale).round() as i32;
    let config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_maximum_height(height);
    let bitmap = page.render_with_config(&config).map_err(failed)?;

    let img = RgbaImage::from_raw(
        bitmap.width() as u32,
        bitmap.height() as u32,
        bitmap.as_rgba_bytes(),
    )
    .ok_or_else(|| CertError::Preview("bitmap size does not match its buffer".to_string()))?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    info!("Rendered preview at {} dpi ({}x{})", dpi, width, height);
    Ok(png)
}

#[cfg(not(feature = "preview"))]
pub fn render_preview(_pdf: &[u8], _dpi: f32) -> Result<Vec<u8>> {
    ensure_preview_support()?;
    Ok(Vec::new())
}
