pub mod data;
pub mod roster;
pub mod sample;
pub mod variant;

pub use data::{
    default_date, sanitize_filename, CertificateRequest, LayoutMode, RenderOptions, SizingMode,
};
pub use roster::{Roster, SignatureSource, Signer};
pub use variant::{TemplateVariant, VariantInfo};
