use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template file not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Page {page} does not exist, template has {total} pages")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Unknown template variant '{0}'")]
    UnknownVariant(String),

    #[error("Signer '{0}' is not in the roster")]
    UnknownSigner(String),

    #[error("Signature image for '{signer}' could not be loaded: {reason}")]
    SignatureImage { signer: String, reason: String },

    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("No names given for batch generation")]
    NoNames,

    #[error("Preview rendering failed: {0}")]
    Preview(String),
}

pub type Result<T> = std::result::Result<T, CertError>;
