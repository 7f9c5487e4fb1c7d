//! PDF layout of the narrative and charts.
//!
//! The document is US letter with one-inch margins: a centered title and
//! date, the parsed narrative, then each chart scaled to 6in x 4in.

use crate::config::PdfConfig;
use crate::error::ReportError;
use crate::report::fonts::resolve_font_family;
use crate::report::markup::{parse_narrative, Block, Inline};
use chrono::Local;
use genpdf::elements::{Break, Image, Paragraph};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, Margins, Mm, PaperSize, Scale, SimplePageDecorator};
use image::GenericImageView;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARGIN_MM: f64 = 25.4;
const BULLET_INDENT_MM: f64 = 7.0;
const IMAGE_WIDTH_MM: f64 = 152.4;
const IMAGE_HEIGHT_MM: f64 = 101.6;
// genpdf lays images out at 300 dpi unless scaled.
const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

const TITLE_SIZE: u8 = 24;
const HEADER_SIZE: u8 = 16;
const BODY_SIZE: u8 = 12;
const TITLE_COLOR: Color = Color::Rgb(0x2E, 0x40, 0x53);
const HEADER_COLOR: Color = Color::Rgb(0x28, 0x74, 0xA6);
const BULLET_GLYPH: &str = "\u{2022}";

/// Lay out `narrative` and `images` into a PDF at `destination`.
///
/// The destination is opened before anything else so an unwritable path
/// is reported as [`ReportError::Render`]. A partially written file is
/// removed on failure.
pub fn render_report(
    narrative: &str,
    images: &[PathBuf],
    destination: &Path,
    config: &PdfConfig,
) -> Result<(), ReportError> {
    let file = File::create(destination).map_err(|e| ReportError::render(destination, e))?;

    let result = write_document(narrative, images, file, destination, config);
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(destination) {
            debug!("Could not remove partial {}: {}", destination.display(), e);
        }
    }
    result
}

fn write_document(
    narrative: &str,
    images: &[PathBuf],
    file: File,
    destination: &Path,
    config: &PdfConfig,
) -> Result<(), ReportError> {
    let family = resolve_font_family(config)?;

    let mut doc = genpdf::Document::new(family);
    doc.set_title(config.title.clone());
    doc.set_paper_size(PaperSize::Letter);
    doc.set_font_size(BODY_SIZE);
    doc.set_line_spacing(1.15);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Mm::from(MARGIN_MM));
    doc.set_page_decorator(decorator);

    push_title(&mut doc, &config.title);

    let parsed = parse_narrative(narrative);
    debug!("Narrative parsed into {} blocks", parsed.blocks.len());
    for block in parsed.blocks {
        push_block(&mut doc, block);
    }

    doc.push(Break::new(2.0));
    for path in images {
        match load_image(path) {
            Ok(image) => {
                doc.push(image);
                doc.push(Break::new(2.0));
            }
            Err(e) => warn!("Skipping chart {}: {}", path.display(), e),
        }
    }

    doc.render(&mut BufWriter::new(file))
        .map_err(|e| ReportError::render(destination, e))?;

    info!("PDF written to {}", destination.display());
    Ok(())
}

fn push_title(doc: &mut genpdf::Document, title: &str) {
    let title_style = Style::new()
        .bold()
        .with_font_size(TITLE_SIZE)
        .with_color(TITLE_COLOR);
    doc.push(Paragraph::new(title).aligned(Alignment::Center).styled(title_style));

    let date = format!("Generated on {}", Local::now().format("%B %d, %Y"));
    doc.push(Paragraph::new(date).aligned(Alignment::Center));
    doc.push(Break::new(2.0));
}

fn push_block(doc: &mut genpdf::Document, block: Block) {
    match block {
        Block::Spacer => doc.push(Break::new(0.5)),
        Block::Header(text) => {
            let style = Style::new()
                .bold()
                .with_font_size(HEADER_SIZE)
                .with_color(HEADER_COLOR);
            doc.push(Break::new(0.5));
            doc.push(Paragraph::new(text).styled(style));
            doc.push(Break::new(0.5));
        }
        Block::Bullet(runs) => {
            let indent = Margins::trbl(0, 0, 0, Mm::from(BULLET_INDENT_MM));
            doc.push(paragraph(runs).padded(indent));
        }
        Block::Body(runs) => doc.push(paragraph(runs)),
    }
}

fn paragraph(runs: Vec<Inline>) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for (i, run) in runs.into_iter().enumerate() {
        if i > 0 {
            paragraph.push(" ");
        }
        match run {
            Inline::Text(text) => paragraph.push(text),
            Inline::Bold(text) => paragraph.push_styled(text, Style::new().bold()),
            Inline::Glyph => paragraph.push(BULLET_GLYPH),
        }
    }
    paragraph
}

fn load_image(path: &Path) -> Result<Image, String> {
    let decoded = image::open(path).map_err(|e| e.to_string())?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err("image has no pixels".to_string());
    }

    // genpdf rejects images with an alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let scale = image_scale(width, height);

    Image::from_dynamic_image(rgb)
        .map(|image| image.with_scale(scale).with_alignment(Alignment::Center))
        .map_err(|e| e.to_string())
}

/// Scale that maps a `width` x `height` pixel image onto the fixed chart box.
fn image_scale(width: u32, height: u32) -> Scale {
    let natural = |px: u32| MM_PER_INCH * f64::from(px) / IMAGE_DPI;
    Scale::new(
        IMAGE_WIDTH_MM / natural(width),
        IMAGE_HEIGHT_MM / natural(height),
    )
}
