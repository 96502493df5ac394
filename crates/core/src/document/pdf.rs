use crate::chart::{slice_color, ChartBitmap};
use crate::document::format::{format_amount, wrap_text};
use crate::document::layout::{Block, ChartBlock, ReportLayout};
use anyhow::{anyhow, Context};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;

const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 14.0;
const LINE_H: f32 = 6.5;
const HEADING_H: f32 = 11.0;
const CHART_MM: f32 = 65.0;
const VALUE_X: f32 = 95.0;
// Approximate characters per line at BODY_SIZE for the available widths.
const WRAP_FULL: usize = 92;
const WRAP_VALUE: usize = 52;
// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Writer {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    pages: Vec<PdfLayerReference>,
    y: f32,
}

impl Writer {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages.push(self.layer.clone());
        self.y = PAGE_H - MARGIN;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < MARGIN + 8.0 {
            self.new_page();
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn heading(&mut self, title: &str) {
        self.ensure_space(HEADING_H + LINE_H);
        self.y -= HEADING_H;
        self.text(title, HEADING_SIZE, MARGIN, self.y, true);
        self.y -= 2.0;
    }

    fn field(&mut self, label: &str, value: &str, bold: bool) {
        let lines = wrap_text(value, WRAP_VALUE);
        self.ensure_space(LINE_H * lines.len() as f32);
        self.y -= LINE_H;
        self.text(&format!("{label}:"), BODY_SIZE, MARGIN, self.y, bold);
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                self.y -= LINE_H;
            }
            self.text(line, BODY_SIZE, VALUE_X, self.y, bold);
        }
    }

    fn paragraph(&mut self, text: &str, indent: f32) {
        for line in wrap_text(text, WRAP_FULL) {
            self.ensure_space(LINE_H);
            self.y -= LINE_H;
            self.text(&line, BODY_SIZE, MARGIN + indent, self.y, false);
        }
    }

    fn chart(&mut self, block: &ChartBlock) -> anyhow::Result<()> {
        let legend_h = LINE_H * (block.chart.slices.len() as f32 + 1.0);
        self.ensure_space(CHART_MM.max(legend_h) + 6.0);
        self.y -= 4.0;
        let top = self.y;

        let image = bitmap_image(&block.bitmap)?;
        let dpi = block.bitmap.width as f32 * 25.4 / CHART_MM;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(top - CHART_MM)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        let legend_x = MARGIN + CHART_MM + 8.0;
        let mut ly = top - LINE_H;
        self.text(&block.chart.title, BODY_SIZE, legend_x, ly, true);
        for (idx, slice) in block.chart.slices.iter().enumerate() {
            ly -= LINE_H;
            let (r, g, b) = slice_color(idx);
            self.layer.set_fill_color(rgb(r, g, b));
            self.text(
                &format!(
                    "{}  {}  ({:.1}%)",
                    slice.label,
                    format_amount(slice.value),
                    slice.percent
                ),
                BODY_SIZE - 1.0,
                legend_x,
                ly,
                false,
            );
        }
        self.layer.set_fill_color(rgb(0, 0, 0));

        self.y = top - CHART_MM.max(legend_h) - 2.0;
        Ok(())
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn bitmap_image(bitmap: &ChartBitmap) -> anyhow::Result<Image> {
    let buf = RgbImage::from_raw(bitmap.width, bitmap.height, bitmap.rgb.clone())
        .context("chart bitmap size does not match its pixel buffer")?;
    Ok(Image::from_dynamic_image(&DynamicImage::ImageRgb8(buf)))
}

fn centered_x(text: &str, size: f32) -> f32 {
    let width = text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM;
    ((PAGE_W - width) / 2.0).max(MARGIN)
}

/// Lays the report out on A4 pages and serializes it.
pub fn render_pdf(layout: &ReportLayout) -> anyhow::Result<Vec<u8>> {
    let (doc, cover_page, cover_layer) =
        PdfDocument::new(&layout.cover.title, Mm(PAGE_W), Mm(PAGE_H), "Cover");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("failed to load Helvetica: {e}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("failed to load Helvetica-Bold: {e}"))?,
    };
    let cover = doc.get_page(cover_page).get_layer(cover_layer);

    let mut w = Writer {
        doc,
        fonts,
        layer: cover,
        pages: Vec::new(),
        y: PAGE_H - MARGIN,
    };

    let c = &layout.cover;
    w.text(&c.title, 24.0, centered_x(&c.title, 24.0), 190.0, true);
    w.text(&c.client_name, 18.0, centered_x(&c.client_name, 18.0), 172.0, false);
    w.text(&c.date, 12.0, centered_x(&c.date, 12.0), 160.0, false);
    let mut fy = 50.0;
    for line in &c.footer {
        w.text(line, 10.0, centered_x(line, 10.0), fy, false);
        fy -= 5.5;
    }

    w.new_page();
    for section in &layout.sections {
        w.heading(&section.title);
        for block in &section.blocks {
            match block {
                Block::Field { label, value } => w.field(label, value, false),
                Block::Total { label, value } => w.field(label, value, true),
                Block::Bullet(s) => w.paragraph(&format!("- {s}"), 4.0),
                Block::Paragraph(s) => w.paragraph(s, 0.0),
                Block::Chart(chart) => w.chart(chart)?,
            }
        }
        w.y -= 3.0;
    }

    let total = w.pages.len();
    for (idx, layer) in w.pages.iter().enumerate() {
        let label = format!("Page {} of {}", idx + 1, total);
        layer.use_text(
            label.as_str(),
            9.0,
            Mm(PAGE_W - MARGIN - 25.0),
            Mm(MARGIN / 2.0),
            &w.fonts.regular,
        );
    }

    w.doc
        .save_to_bytes()
        .map_err(|e| anyhow!("failed to serialize pdf: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvisorIdentity;
    use crate::document::layout::compose;
    use crate::domain::recommendation::classify;
    use crate::intake::Intake;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn render(pairs: &[(&str, &str)]) -> Vec<u8> {
        let form: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let intake = Intake::from_form(&form);
        let c = classify(intake.profile.age, &intake.profile.risk);
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let layout = compose(&intake, &c, &AdvisorIdentity::default(), date).unwrap();
        render_pdf(&layout).unwrap()
    }

    #[test]
    fn renders_identity_only_submission() {
        let bytes = render(&[("name", "Asha Rao")]);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_charts_and_long_text() {
        let long = "retire early and travel ".repeat(60);
        let bytes = render(&[
            ("name", "Asha Rao"),
            ("monthly_salary", "90000"),
            ("rental_income", "15000"),
            ("household", "30000"),
            ("education", "12000"),
            ("other_goals", long.as_str()),
            ("consent", "on"),
        ]);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn centering_never_crosses_margin() {
        assert_eq!(centered_x(&"x".repeat(500), 24.0), MARGIN);
        assert!(centered_x("Title", 24.0) > MARGIN);
    }
}
