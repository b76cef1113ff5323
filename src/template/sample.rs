//! Erzeugt eine Demo-Vorlage mit demselben Seitenaufbau wie die echte
//! Onboarding-Vorlage, dazu Beispiel-Unterschriften und einen Roster.
//! Wird von `certfill example` und von den Tests verwendet.

use crate::error::Result;
use crate::template::roster::{Roster, SignatureSource, Signer};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::io::Cursor;

pub use crate::template::data::{DATE_PLACEHOLDER, NAME_PLACEHOLDER};
pub use crate::template::variant::REFERENCE_PHRASE;

pub const CREATOR: &str = "Jane Doe";
pub const CO_SIGNER: &str = "John Smith";

const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;

/// Ein Textstück: Font-Ressource, Größe, Position, Inhalt
struct Line<'a> {
    font: &'a str,
    size: f32,
    x: f32,
    y: f32,
    text: &'a str,
}

fn line<'a>(font: &'a str, size: f32, x: f32, y: f32, text: &'a str) -> Line<'a> {
    Line { font, size, x, y, text }
}

fn show(line: &Line) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(line.font.as_bytes().to_vec()), Object::Real(line.size)],
        ),
        Operation::new("Td", vec![Object::Real(line.x), Object::Real(line.y)]),
        Operation::new("Tj", vec![Object::string_literal(line.text)]),
        Operation::new("ET", vec![]),
    ]
}

fn page_ops(lines: &[Line]) -> Vec<Operation> {
    lines.iter().flat_map(show).collect()
}

/// Gemeinsamer Text der Zertifikatsseiten, Name per `Tj`
fn certificate_body(title: &str) -> Vec<Operation> {
    page_ops(&[
        line("F2", 28.0, 120.0, 480.0, title),
        line("F1", 14.0, 120.0, 400.0, "This certifies that"),
        line("F2", 24.0, 120.0, 360.0, NAME_PLACEHOLDER),
        line("F1", 14.0, 120.0, 320.0, "has successfully completed the onboarding programme"),
        line("F1", 12.0, 120.0, 280.0, "Date: DD-MMM-YYYY"),
    ])
}

/// Wie `certificate_body`, aber der Name steht gekernt in einem `TJ`-Array
fn kerned_certificate_body(title: &str) -> Vec<Operation> {
    let mut ops = page_ops(&[
        line("F2", 28.0, 120.0, 480.0, title),
        line("F1", 14.0, 120.0, 400.0, "This certifies that"),
    ]);
    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F2".to_vec()), Object::Real(24.0)]),
        Operation::new("Td", vec![Object::Real(120.0), Object::Real(360.0)]),
        Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("[Empl"),
                Object::Integer(-15),
                Object::string_literal("oyee Na"),
                Object::Integer(10),
                Object::string_literal("me]"),
            ])],
        ),
        Operation::new("ET", vec![]),
    ]);
    ops.extend(page_ops(&[
        line("F1", 14.0, 120.0, 320.0, "has successfully completed the onboarding programme"),
        line("F1", 12.0, 120.0, 280.0, "Date: DD-MMM-YYYY"),
    ]));
    ops
}

fn pages() -> Vec<Vec<Operation>> {
    let mut easymap = certificate_body("EasyMap Certificate");
    easymap.extend(page_ops(&[
        line("F2", 11.0, 160.0, 90.0, CREATOR),
        line("F1", 9.0, 160.0, 78.0, "Operations Lead"),
        line("F2", 11.0, 560.0, 90.0, CO_SIGNER),
        line("F1", 9.0, 560.0, 78.0, "Head of Monitoring"),
    ]));

    vec![
        page_ops(&[
            line("F2", 32.0, 120.0, 420.0, "Onboarding Certificates"),
            line("F1", 14.0, 120.0, 380.0, "CR team templates"),
        ]),
        page_ops(&[
            line("F2", 18.0, 120.0, 480.0, "How to use"),
            line("F1", 12.0, 120.0, 450.0, "Pick the certificate page that matches the programme."),
        ]),
        page_ops(&[line("F1", 12.0, 120.0, 480.0, "Intentionally left blank")]),
        certificate_body("Monitoring Certificate"),
        kerned_certificate_body("Monitoring Certificate"),
        easymap,
    ]
}

/// Baut die sechsseitige Demo-Vorlage (A4 quer, Seiten 3 bis 5 sind Zertifikate)
pub fn build_template() -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::new();
    for operations in pages() {
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    // Resources und MediaBox werden von den Seiten geerbt
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)?;
    Ok(output)
}

/// Handschrift-ähnliche Linie auf transparentem Grund, `seed` variiert die Form
pub fn signature_png(seed: u8) -> Result<Vec<u8>> {
    let (width, height) = (240u32, 80u32);
    let mut img = RgbaImage::new(width, height);
    let ink = Rgba([20, 30, 110, 255]);
    let amplitude = 18.0 + f32::from(seed % 5) * 3.0;
    let frequency = 0.05 + f32::from(seed % 3) * 0.015;

    for x in 10..width - 10 {
        let y = height as f32 / 2.0 + amplitude * (x as f32 * frequency).sin();
        for dy in -1i32..=1 {
            let py = y as i32 + dy;
            if (0..height as i32).contains(&py) {
                img.put_pixel(x, py as u32, ink);
            }
        }
    }

    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)?;
    Ok(buffer)
}

/// Roster mit beiden Demo-Unterzeichnern, Unterschriften inline
pub fn roster() -> Result<Roster> {
    let mut roster = Roster::default();
    roster.co_signer = Some(CO_SIGNER.to_string());
    roster.insert(
        CREATOR,
        Signer {
            title: "Operations Lead".to_string(),
            signature: Some(SignatureSource::Base64(STANDARD.encode(signature_png(1)?))),
        },
    );
    roster.insert(
        CO_SIGNER,
        Signer {
            title: "Head of Monitoring".to_string(),
            signature: Some(SignatureSource::Base64(STANDARD.encode(signature_png(2)?))),
        },
    );
    Ok(roster)
}
