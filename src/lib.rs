//! # certfill
//!
//! A library and CLI tool for filling onboarding certificates from a PDF template:
//! placeholders are located and replaced, signatures are stamped and the
//! certificate page is exported on its own.

pub mod cli;
pub mod error;
pub mod export;
pub mod interactive;
pub mod pdf;
pub mod template;

// Re-exports
pub use cli::{Cli, Commands};
pub use error::{CertError, Result};
pub use export::{BatchArchive, Certificate, CertificateGenerator};
pub use pdf::{PlaceholderReplacer, TemplateDocument};
pub use template::{CertificateRequest, RenderOptions, Roster, TemplateVariant};
