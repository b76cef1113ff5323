use certfill::cli::{RenderArgs, RequestArgs, SourceArgs};
use certfill::export::{
    ensure_preview_support, locate_placeholders, parse_names, render_preview, PREVIEW_DPI,
};
use certfill::interactive::Prompter;
use certfill::template::{default_date, sample};
use certfill::{
    CertificateGenerator, CertificateRequest, Cli, Commands, Result, Roster, TemplateDocument,
    TemplateVariant,
};
use clap::Parser;
use log::{error, info};
use std::io::Read;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(e) = run() {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logging initialisieren
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Fill {
            source,
            name,
            request,
            output,
            preview,
            render,
        } => {
            info!("Filling single certificate");
            let written = fill_single(&source, name, &request, output, preview.as_deref(), &render)?;
            println!("✓ Certificate created: {}", written.display());
        }

        Commands::Batch {
            source,
            names,
            request,
            output,
            render,
        } => {
            info!("Starting batch processing");
            let count = fill_batch(&source, &names, &request, &output, &render)?;
            println!("✓ Created {} certificates in {}", count, output.display());
        }

        Commands::Locate {
            source,
            variant,
            json,
        } => {
            locate(&source, variant, json)?;
        }

        Commands::Variants { json } => {
            list_variants(json)?;
        }

        Commands::Example { output, template } => {
            info!("Generating example roster");
            generate_example(&output, template.as_deref())?;
            println!("✓ Example file created: {}", output.display());
        }

        Commands::Interactive {
            source,
            output,
            render,
        } => {
            if let Some(written) = fill_interactive(&source, output, &render)? {
                println!("✓ Certificate created: {}", written.display());
            }
        }
    }

    Ok(())
}

fn load_roster(path: Option<&Path>) -> Result<Roster> {
    match path {
        Some(path) => Roster::from_json_file(path),
        None => Ok(Roster::default()),
    }
}

fn build_request(name: String, request: &RequestArgs) -> CertificateRequest {
    let date = request.date.clone().unwrap_or_else(default_date);
    let mut built = CertificateRequest::new(name, date, request.variant);
    if let Some(creator) = &request.creator {
        built = built.with_creator(creator.clone());
    }
    built
}

fn fill_single(
    source: &SourceArgs,
    name: String,
    request: &RequestArgs,
    output: Option<PathBuf>,
    preview: Option<&Path>,
    render: &RenderArgs,
) -> Result<PathBuf> {
    if preview.is_some() {
        ensure_preview_support()?;
    }
    let template = TemplateDocument::open(&source.template)?;
    let roster = load_roster(source.roster.as_deref())?;
    let generator = CertificateGenerator::new(&template, &roster, render.to_options());

    let certificate = generator.generate(&build_request(name, request))?;
    let output = output.unwrap_or_else(|| PathBuf::from(&certificate.file_name));
    std::fs::write(&output, &certificate.pdf)?;

    if let Some(preview) = preview {
        let png = render_preview(&certificate.pdf, PREVIEW_DPI)?;
        std::fs::write(preview, png)?;
        info!("Preview written to {}", preview.display());
    }

    Ok(output)
}

fn fill_batch(
    source: &SourceArgs,
    names_path: &Path,
    request: &RequestArgs,
    output: &Path,
    render: &RenderArgs,
) -> Result<usize> {
    let template = TemplateDocument::open(&source.template)?;
    let roster = load_roster(source.roster.as_deref())?;

    let content = if names_path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(names_path)?
    };
    let names = parse_names(&content);

    let generator = CertificateGenerator::new(&template, &roster, render.to_options());
    let batch = generator.generate_batch(&names, &build_request(String::new(), request))?;
    std::fs::write(output, &batch.bytes)?;

    Ok(batch.entries.len())
}

fn locate(source: &SourceArgs, variant: TemplateVariant, json: bool) -> Result<()> {
    let template = TemplateDocument::open(&source.template)?;
    let roster = load_roster(source.roster.as_deref())?;
    let located = locate_placeholders(&template, variant, &roster.names())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&located)?);
        return Ok(());
    }

    println!("Page {} ({})", variant.page_index(), variant.label());
    for entry in &located {
        if entry.rects.is_empty() {
            println!("  ✗ {:<30} not found", entry.text);
        }
        for (rect, baseline) in entry.rects.iter().zip(&entry.baselines) {
            println!(
                "  ✓ {:<30} x0={:>7.2} y0={:>7.2} x1={:>7.2} y1={:>7.2} baseline={:>7.2}",
                entry.text, rect.x0, rect.y0, rect.x1, rect.y1, baseline
            );
        }
    }
    Ok(())
}

fn list_variants(json: bool) -> Result<()> {
    let infos: Vec<_> = TemplateVariant::all().iter().map(|v| v.describe()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }
    for info in infos {
        println!(
            "{:<22} page {}  {:<9} {}",
            info.key, info.page, info.layout, info.label
        );
    }
    Ok(())
}

fn generate_example(output: &Path, template: Option<&Path>) -> Result<()> {
    let roster = sample::roster()?;
    let json = serde_json::to_string_pretty(&roster)?;
    std::fs::write(output, json)?;

    if let Some(template) = template {
        std::fs::write(template, sample::build_template()?)?;
        println!("✓ Demo template created: {}", template.display());
    }
    Ok(())
}

fn fill_interactive(
    source: &SourceArgs,
    output: Option<PathBuf>,
    render: &RenderArgs,
) -> Result<Option<PathBuf>> {
    let template = TemplateDocument::open(&source.template)?;
    let roster = load_roster(source.roster.as_deref())?;

    let Some(request) = Prompter::stdio().ask_request(&roster)? else {
        return Ok(None);
    };

    let generator = CertificateGenerator::new(&template, &roster, render.to_options());
    let certificate = generator.generate(&request)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&certificate.file_name));
    std::fs::write(&output, &certificate.pdf)?;
    Ok(Some(output))
}
