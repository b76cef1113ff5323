use crate::error::{CertError, Result};
use crate::pdf::SignatureLayout;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Satz im Fließtext, an dessen Höhe sich der Name orientiert
pub const REFERENCE_PHRASE: &str = "has successfully completed";

/// Abstand der verankerten Unterschrift über dem gedruckten Namen (pt)
pub const ANCHOR_GAP: f32 = 4.0;

/// Die Zertifikatstypen der Vorlage, je einer pro Seite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum TemplateVariant {
    /// Monitoring, Ersteller und Mitunterzeichner
    #[default]
    #[value(name = "monitoring-2-signer")]
    #[serde(rename = "monitoring-2-signer")]
    Monitoring2Signer,

    /// Monitoring, nur der Ersteller
    #[value(name = "monitoring-1-signer")]
    #[serde(rename = "monitoring-1-signer")]
    Monitoring1Signer,

    /// EasyMap, Namen der Unterzeichner sind vorgedruckt
    #[value(name = "easymap")]
    #[serde(rename = "easymap")]
    EasyMap,
}

/// Zeile für `variants`
#[derive(Debug, Clone, Serialize)]
pub struct VariantInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub page: usize,
    pub layout: &'static str,
    pub reference_phrase: &'static str,
}

impl TemplateVariant {
    pub fn all() -> [TemplateVariant; 3] {
        [
            TemplateVariant::Monitoring2Signer,
            TemplateVariant::Monitoring1Signer,
            TemplateVariant::EasyMap,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            TemplateVariant::Monitoring2Signer => "monitoring-2-signer",
            TemplateVariant::Monitoring1Signer => "monitoring-1-signer",
            TemplateVariant::EasyMap => "easymap",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateVariant::Monitoring2Signer => "Monitoring (2 signers)",
            TemplateVariant::Monitoring1Signer => "Monitoring (1 signer)",
            TemplateVariant::EasyMap => "EasyMap",
        }
    }

    /// 0-basierter Seitenindex in der Vorlage
    pub fn page_index(&self) -> usize {
        match self {
            TemplateVariant::Monitoring2Signer => 3,
            TemplateVariant::Monitoring1Signer => 4,
            TemplateVariant::EasyMap => 5,
        }
    }

    pub fn reference_phrase(&self) -> &'static str {
        REFERENCE_PHRASE
    }

    pub fn signature_layout(&self, co_signer: Option<&str>) -> SignatureLayout {
        match self {
            TemplateVariant::Monitoring2Signer => SignatureLayout::Split {
                co_signer: co_signer.map(str::to_string),
            },
            TemplateVariant::Monitoring1Signer => SignatureLayout::Centered,
            TemplateVariant::EasyMap => SignatureLayout::Anchored {
                dx: 0.0,
                dy: ANCHOR_GAP,
            },
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        let wanted = key.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|v| v.key() == wanted)
            .ok_or_else(|| CertError::UnknownVariant(key.to_string()))
    }

    pub fn describe(&self) -> VariantInfo {
        VariantInfo {
            key: self.key(),
            label: self.label(),
            page: self.page_index(),
            layout: self.signature_layout(None).kind(),
            reference_phrase: self.reference_phrase(),
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_roundtrips_every_variant() {
        for variant in TemplateVariant::all() {
            assert_eq!(TemplateVariant::from_key(variant.key()).unwrap(), variant);
        }
        assert_eq!(
            TemplateVariant::from_key(" EasyMap ").unwrap(),
            TemplateVariant::EasyMap
        );
    }

    #[test]
    fn test_unknown_variant() {
        assert!(matches!(
            TemplateVariant::from_key("diploma"),
            Err(CertError::UnknownVariant(_))
        ));
    }

    #[test]
    fn test_pages_are_distinct() {
        let pages: Vec<usize> = TemplateVariant::all().iter().map(|v| v.page_index()).collect();
        assert_eq!(pages, vec![3, 4, 5]);
    }

    #[test]
    fn test_two_signer_layout_carries_co_signer() {
        let layout = TemplateVariant::Monitoring2Signer.signature_layout(Some("John Smith"));
        assert_eq!(
            layout,
            SignatureLayout::Split {
                co_signer: Some("John Smith".to_string())
            }
        );
    }

    #[test]
    fn test_serde_uses_cli_keys() {
        let json = serde_json::to_string(&TemplateVariant::Monitoring1Signer).unwrap();
        assert_eq!(json, "\"monitoring-1-signer\"");
        let parsed: TemplateVariant = serde_json::from_str("\"easymap\"").unwrap();
        assert_eq!(parsed, TemplateVariant::EasyMap);
    }
}
