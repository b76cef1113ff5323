use crate::pdf::{
    EraseMode, FontSizing, Replacement, Rgb, SignatureGeometry, SignatureLayout, StandardFont,
};
use crate::template::variant::ANCHOR_GAP;
use crate::template::TemplateVariant;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const NAME_PLACEHOLDER: &str = "[Employee Name]";
pub const DATE_PLACEHOLDER: &str = "DD-MMM-YYYY";

/// Datumsformat der Vorlage, z.B. 12-Dec-2025
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Daten für ein Zertifikat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub name: String,

    pub date: String,

    #[serde(default)]
    pub variant: TemplateVariant,

    /// Ersteller, unterschreibt links bzw. allein
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl CertificateRequest {
    pub fn new(name: String, date: String, variant: TemplateVariant) -> Self {
        Self {
            name,
            date,
            variant,
            creator: None,
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Gibt alle Platzhalter mit ihren Ersetzungen zurück
    pub fn to_replacements(&self, options: &RenderOptions) -> Vec<Replacement> {
        vec![
            Replacement::new(NAME_PLACEHOLDER, self.name.trim(), StandardFont::HelveticaBold)
                .with_color(options.name_color)
                .with_offset(options.name_dx, options.name_dy),
            Replacement::new(DATE_PLACEHOLDER, self.date.trim(), StandardFont::Helvetica)
                .with_color(options.date_color)
                .with_offset(options.date_dx, options.date_dy),
        ]
    }

    /// z.B. `Mario_Rossi_Onboarding_Certificate.pdf`
    pub fn output_file_name(&self) -> String {
        format!("{}_Onboarding_Certificate.pdf", sanitize_filename(&self.name))
    }
}

/// Wie die Schriftgröße des Ersatztextes bestimmt wird
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    #[default]
    Fixed,
    Placeholder,
    Reference,
}

/// Unterschriftenlayout unabhängig von der Variante erzwingen
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    None,
    Centered,
    Split,
    Absolute,
    Anchored,
}

/// Darstellung und Kalibrierung, gilt für alle Zertifikate eines Laufs
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub erase: EraseMode,
    pub sizing: SizingMode,
    /// Nur bei `SizingMode::Fixed`
    pub font_size: f32,
    pub name_color: Rgb,
    pub date_color: Rgb,
    pub background: Rgb,
    pub name_dx: f32,
    pub name_dy: f32,
    pub date_dx: f32,
    pub date_dy: f32,
    pub signature: SignatureGeometry,
    /// `None`: Layout der Variante
    pub layout: Option<LayoutMode>,
    /// Linke Kante bei `LayoutMode::Absolute`, die Unterkante ist `signature.y`
    pub sig_x: f32,
}

impl RenderOptions {
    pub fn font_sizing(&self, variant: TemplateVariant) -> FontSizing {
        match self.sizing {
            SizingMode::Fixed => FontSizing::Fixed(self.font_size),
            SizingMode::Placeholder => FontSizing::Placeholder,
            SizingMode::Reference => FontSizing::Reference(variant.reference_phrase().to_string()),
        }
    }

    pub fn signature_layout(&self, variant: TemplateVariant, co_signer: Option<&str>) -> SignatureLayout {
        let Some(mode) = self.layout else {
            return variant.signature_layout(co_signer);
        };
        match mode {
            LayoutMode::None => SignatureLayout::None,
            LayoutMode::Centered => SignatureLayout::Centered,
            LayoutMode::Split => SignatureLayout::Split {
                co_signer: co_signer.map(str::to_string),
            },
            LayoutMode::Absolute => SignatureLayout::Absolute {
                x: self.sig_x,
                y: self.signature.y,
            },
            LayoutMode::Anchored => SignatureLayout::Anchored {
                dx: 0.0,
                dy: ANCHOR_GAP,
            },
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            erase: EraseMode::default(),
            sizing: SizingMode::default(),
            font_size: 12.0,
            name_color: Rgb::BLACK,
            date_color: Rgb::BLACK,
            background: Rgb::WHITE,
            name_dx: 0.0,
            name_dy: 0.0,
            date_dx: 0.0,
            date_dy: 0.0,
            signature: SignatureGeometry::default(),
            layout: None,
            sig_x: 72.0,
        }
    }
}

/// Heutiges Datum im Format der Vorlage
pub fn default_date() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

fn underscores() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("_{2,}").expect("static pattern"))
}

pub fn sanitize_filename(s: &str) -> String {
    let mapped: String = s
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            ' ' => '_',
            'ä' | 'à' | 'á' | 'â' => 'a',
            'Ä' | 'À' | 'Á' | 'Â' => 'A',
            'ö' | 'ò' | 'ó' | 'ô' => 'o',
            'Ö' | 'Ò' | 'Ó' | 'Ô' => 'O',
            'ü' | 'ù' | 'ú' | 'û' => 'u',
            'Ü' | 'Ù' | 'Ú' | 'Û' => 'U',
            'è' | 'é' | 'ê' => 'e',
            'È' | 'É' | 'Ê' => 'E',
            'ì' | 'í' | 'î' => 'i',
            'ç' => 'c',
            'ñ' => 'n',
            'ß' => 's',
            _ => '_',
        })
        .collect();

    let collapsed = underscores().replace_all(&mapped, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "Certificate".to_string()
    } else {
        trimmed.to_string()
    }
}
