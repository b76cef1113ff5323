use crate::error::{CertError, Result};
use crate::pdf::RasterImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Herkunft eines Unterschriftsbildes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureSource {
    /// Relativ zur Roster-Datei, sonst zum Arbeitsverzeichnis
    Path(PathBuf),
    Base64(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signer {
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureSource>,
}

/// Bekannte Unterzeichner mit Titel und Unterschrift
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Fester Mitunterzeichner für zweispaltige Varianten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_signer: Option<String>,

    #[serde(default)]
    pub signers: BTreeMap<String, Signer>,

    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Roster {
    /// Lädt den Roster aus einer JSON-Datei
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut roster = Self::from_json_str(&content)?;
        roster.base_dir = path.parent().map(Path::to_path_buf);
        info!("Loaded roster {} ({} signers)", path.display(), roster.signers.len());
        Ok(roster)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let roster: Roster = serde_json::from_str(content)?;
        if let Some(co) = &roster.co_signer {
            if !roster.signers.contains_key(co) {
                warn!("Co-signer '{}' is not listed in the roster", co);
            }
        }
        Ok(roster)
    }

    pub fn insert(&mut self, name: impl Into<String>, signer: Signer) {
        self.signers.insert(name.into(), signer);
    }

    pub fn get(&self, name: &str) -> Result<&Signer> {
        self.signers
            .get(name)
            .ok_or_else(|| CertError::UnknownSigner(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.signers.keys().map(String::as_str).collect()
    }

    pub fn co_signer(&self) -> Option<&str> {
        self.co_signer.as_deref()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Rohe Bilddaten der Unterschrift, `None` wenn keine hinterlegt ist
    pub fn signature_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let signer = self.get(name)?;
        let failed = |reason: String| CertError::SignatureImage {
            signer: name.to_string(),
            reason,
        };

        match &signer.signature {
            None => Ok(None),
            Some(SignatureSource::Path(path)) => {
                let full = self.resolve_path(path);
                debug!("Reading signature of '{}' from {}", name, full.display());
                std::fs::read(&full)
                    .map(Some)
                    .map_err(|e| failed(format!("{}: {}", full.display(), e)))
            }
            Some(SignatureSource::Base64(data)) => STANDARD
                .decode(data.trim())
                .map(Some)
                .map_err(|e| failed(format!("invalid base64: {}", e))),
        }
    }

    pub fn signature_image(&self, name: &str) -> Result<Option<RasterImage>> {
        match self.signature_bytes(name)? {
            None => Ok(None),
            Some(bytes) => RasterImage::decode(&bytes).map(Some).map_err(|e| {
                CertError::SignatureImage {
                    signer: name.to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }
}
