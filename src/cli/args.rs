use crate::pdf::{EraseMode, Rgb, SignatureGeometry};
use crate::template::{LayoutMode, RenderOptions, SizingMode, TemplateVariant};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_TEMPLATE: &str = "Onboarding Certificate [CR team].pdf";

#[derive(Parser, Debug)]
#[command(name = "certfill")]
#[command(author, version, about, long_about = None)]
#[command(about = "Fill onboarding certificates from a PDF template")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill a single certificate
    Fill {
        #[command(flatten)]
        source: SourceArgs,

        /// Employee name
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Output PDF (default: <Name>_Onboarding_Certificate.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a PNG preview of the certificate (needs the `preview` feature)
        #[arg(long)]
        preview: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Fill one certificate per name and pack them into a ZIP archive
    Batch {
        #[command(flatten)]
        source: SourceArgs,

        /// Text file with one name per line, `-` reads stdin
        #[arg(short, long)]
        names: PathBuf,

        #[command(flatten)]
        request: RequestArgs,

        /// Output archive
        #[arg(short, long, default_value = "certificates.zip")]
        output: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show where placeholders and reference text sit on a variant page
    Locate {
        #[command(flatten)]
        source: SourceArgs,

        /// Template variant
        #[arg(long, value_enum, default_value_t = TemplateVariant::default())]
        variant: TemplateVariant,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the template variants
    Variants {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write an example roster and optionally a demo template
    Example {
        /// Output path for the roster JSON
        #[arg(short, long, default_value = "roster.json")]
        output: PathBuf,

        /// Also write a demo template PDF to this path
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Ask for name, date, variant and creator and fill one certificate
    Interactive {
        #[command(flatten)]
        source: SourceArgs,

        /// Output PDF (default: <Name>_Onboarding_Certificate.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

/// Vorlage und Roster
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Template PDF
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Signer roster (JSON)
    #[arg(short, long)]
    pub roster: Option<PathBuf>,
}

/// Felder eines Zertifikats außer dem Namen
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Date text, e.g. 12-Dec-2025 (default: today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Template variant
    #[arg(long, value_enum, default_value_t = TemplateVariant::default())]
    pub variant: TemplateVariant,

    /// Creator who signs the certificate (must be in the roster)
    #[arg(short, long)]
    pub creator: Option<String>,
}

/// Darstellung und Kalibrierung
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// How placeholders are removed
    #[arg(long, value_enum, default_value_t = EraseMode::Overdraw)]
    pub erase: EraseMode,

    /// How the replacement font size is chosen
    #[arg(long = "font-size", value_enum, default_value_t = SizingMode::Fixed)]
    pub sizing: SizingMode,

    /// Font size in points for `--font-size fixed`
    #[arg(long, value_parser = parse_positive, default_value_t = 12.0)]
    pub size: f32,

    /// Name color (#RRGGBB)
    #[arg(long, value_parser = parse_color, default_value = "#000000")]
    pub name_color: Rgb,

    /// Date color (#RRGGBB)
    #[arg(long, value_parser = parse_color, default_value = "#000000")]
    pub date_color: Rgb,

    /// Overdraw color (#RRGGBB)
    #[arg(long, value_parser = parse_color, default_value = "#FFFFFF")]
    pub background: Rgb,

    #[arg(long, value_parser = parse_finite, default_value_t = 0.0, allow_negative_numbers = true)]
    pub name_dx: f32,

    #[arg(long, value_parser = parse_finite, default_value_t = 0.0, allow_negative_numbers = true)]
    pub name_dy: f32,

    #[arg(long, value_parser = parse_finite, default_value_t = 0.0, allow_negative_numbers = true)]
    pub date_dx: f32,

    #[arg(long, value_parser = parse_finite, default_value_t = 0.0, allow_negative_numbers = true)]
    pub date_dy: f32,

    /// Signature layout, overrides the one of the variant
    #[arg(long, value_enum)]
    pub layout: Option<LayoutMode>,

    /// Signature box width in points
    #[arg(long, value_parser = parse_positive, default_value_t = 150.0)]
    pub sig_width: f32,

    /// Signature box height in points
    #[arg(long, value_parser = parse_positive, default_value_t = 50.0)]
    pub sig_height: f32,

    /// Left edge of the signature box for `--layout absolute`
    #[arg(long, value_parser = parse_finite, default_value_t = 72.0, allow_negative_numbers = true)]
    pub sig_x: f32,

    /// Bottom edge of the signature boxes, measured from the page bottom
    #[arg(long, value_parser = parse_finite, default_value_t = 110.0, allow_negative_numbers = true)]
    pub sig_y: f32,

    /// Horizontal center of the creator signature as page-width fraction
    #[arg(long, value_parser = parse_finite, default_value_t = 0.25)]
    pub left_fraction: f32,

    /// Horizontal center of the co-signer signature as page-width fraction
    #[arg(long, value_parser = parse_finite, default_value_t = 0.75)]
    pub right_fraction: f32,

    /// Do not print name and title below the signatures
    #[arg(long)]
    pub no_labels: bool,
}

impl RenderArgs {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            erase: self.erase,
            sizing: self.sizing,
            font_size: self.size,
            name_color: self.name_color,
            date_color: self.date_color,
            background: self.background,
            name_dx: self.name_dx,
            name_dy: self.name_dy,
            date_dx: self.date_dx,
            date_dy: self.date_dy,
            signature: SignatureGeometry {
                width: self.sig_width,
                height: self.sig_height,
                y: self.sig_y,
                left_fraction: self.left_fraction,
                right_fraction: self.right_fraction,
                draw_labels: !self.no_labels,
                ..SignatureGeometry::default()
            },
            layout: self.layout,
            sig_x: self.sig_x,
        }
    }
}

/// Parse a #RRGGBB color
fn parse_color(s: &str) -> Result<Rgb, String> {
    s.parse::<Rgb>().map_err(|e| e.to_string())
}

/// Any finite number of points
fn parse_finite(s: &str) -> Result<f32, String> {
    let value: f32 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(value)
}

/// Sizes must be finite and greater than zero
fn parse_positive(s: &str) -> Result<f32, String> {
    let value = parse_finite(s)?;
    if value <= 0.0 {
        return Err(format!("'{}' must be greater than zero", s));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_defaults() {
        let cli = Cli::try_parse_from(["certfill", "fill", "--name", "Mario Rossi"]).unwrap();
        match cli.command {
            Commands::Fill {
                source,
                name,
                request,
                output,
                render,
                ..
            } => {
                assert_eq!(source.template, PathBuf::from(DEFAULT_TEMPLATE));
                assert_eq!(name, "Mario Rossi");
                assert_eq!(request.variant, TemplateVariant::Monitoring2Signer);
                assert!(request.date.is_none());
                assert!(output.is_none());

                let options = render.to_options();
                assert_eq!(options.erase, EraseMode::Overdraw);
                assert_eq!(options.font_size, 12.0);
                assert_eq!(options.background, Rgb::WHITE);
                assert!(options.signature.draw_labels);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_render_overrides() {
        let cli = Cli::try_parse_from([
            "certfill",
            "batch",
            "--names",
            "names.txt",
            "--variant",
            "easymap",
            "--erase",
            "redact",
            "--font-size",
            "reference",
            "--name-color",
            "#FF0000",
            "--name-dy",
            "-3.5",
            "--no-labels",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch { request, render, .. } => {
                assert_eq!(request.variant, TemplateVariant::EasyMap);
                let options = render.to_options();
                assert_eq!(options.erase, EraseMode::Redact);
                assert_eq!(options.sizing, SizingMode::Reference);
                assert_eq!(options.name_color, Rgb { r: 1.0, g: 0.0, b: 0.0 });
                assert_eq!(options.name_dy, -3.5);
                assert!(!options.signature.draw_labels);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_layout_override_flags() {
        let cli = Cli::try_parse_from([
            "certfill", "fill", "--name", "X", "--layout", "absolute", "--sig-x", "300", "--sig-y", "-20",
        ])
        .unwrap();
        match cli.command {
            Commands::Fill { render, .. } => {
                let options = render.to_options();
                assert_eq!(options.layout, Some(LayoutMode::Absolute));
                assert_eq!(options.sig_x, 300.0);
                assert_eq!(options.signature.y, -20.0);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["certfill", "fill", "--name", "X", "--layout", "none"]).unwrap();
        match cli.command {
            Commands::Fill { render, .. } => assert_eq!(render.layout, Some(LayoutMode::None)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        for args in [
            ["--size", "NaN"],
            ["--size", "0"],
            ["--size", "inf"],
            ["--sig-width", "-10"],
            ["--sig-height", "abc"],
            ["--name-dx", "NaN"],
        ] {
            let mut argv = vec!["certfill", "fill", "--name", "X"];
            argv.extend(args);
            assert!(Cli::try_parse_from(argv).is_err(), "{:?}", args);
        }
        assert_eq!(parse_positive("7.5"), Ok(7.5));
        assert_eq!(parse_finite("-3"), Ok(-3.0));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = Cli::try_parse_from(["certfill", "fill", "--name", "X", "--name-color", "red"]);
        assert!(result.is_err());
    }
}
