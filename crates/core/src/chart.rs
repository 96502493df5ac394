use anyhow::anyhow;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;

const BITMAP_SIZE: u32 = 480;
const SVG_WIDTH: u32 = 640;
const SVG_HEIGHT: u32 = 420;
// Arc resolution in points per full turn.
const ARC_STEPS: usize = 360;

const PALETTE: [(u8, u8, u8); 8] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the whole, 0..=100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// Raw RGB pixels, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBitmap {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

pub fn slice_color(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

impl PieChart {
    /// Keeps strictly positive values in input order. Returns `None` when nothing is left to draw.
    pub fn from_amounts<'a, I>(title: &str, items: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let kept: Vec<(&str, f64)> = items
            .into_iter()
            .filter(|(_, v)| v.is_finite() && *v > 0.0)
            .collect();
        if kept.is_empty() {
            return None;
        }

        let total: f64 = kept.iter().map(|(_, v)| v).sum();
        let slices = kept
            .into_iter()
            .map(|(label, value)| PieSlice {
                label: label.to_string(),
                value,
                percent: value / total * 100.0,
            })
            .collect();

        Some(Self {
            title: title.to_string(),
            slices,
        })
    }

    /// Slices only, no text; labels are laid out by whoever embeds the bitmap.
    pub fn render_bitmap(&self) -> anyhow::Result<ChartBitmap> {
        let (w, h) = (BITMAP_SIZE, BITMAP_SIZE);
        let mut rgb = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (w, h)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("chart background fill failed: {e}"))?;
            let center = (w as i32 / 2, h as i32 / 2);
            self.draw_slices(&root, center, (w as i32 / 2) - 8)?;
            root.present()
                .map_err(|e| anyhow!("chart bitmap present failed: {e}"))?;
        }
        Ok(ChartBitmap {
            width: w,
            height: h,
            rgb,
        })
    }

    /// Pie with percentage labels, a title and a legend.
    pub fn render_svg(&self) -> anyhow::Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (SVG_WIDTH, SVG_HEIGHT)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("chart background fill failed: {e}"))?;

            let title_style = ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(
                self.title.clone(),
                (SVG_HEIGHT as i32 / 2, 10),
                title_style,
            ))
            .map_err(|e| anyhow!("chart title draw failed: {e}"))?;

            let center = (SVG_HEIGHT as i32 / 2, SVG_HEIGHT as i32 / 2 + 16);
            let radius = SVG_HEIGHT as i32 / 2 - 40;
            self.draw_slices(&root, center, radius)?;

            let label_style = ("sans-serif", 13)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            let mut start = 0.0;
            for slice in &self.slices {
                let sweep = slice.percent / 100.0 * 2.0 * PI;
                let mid = start + sweep / 2.0;
                let at = polar(center, radius as f64 * 0.65, mid);
                root.draw(&Text::new(
                    format!("{:.1}%", slice.percent),
                    at,
                    label_style.clone(),
                ))
                .map_err(|e| anyhow!("chart label draw failed: {e}"))?;
                start += sweep;
            }

            let legend_x = SVG_HEIGHT as i32 + 10;
            let legend_style = ("sans-serif", 13)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center));
            for (idx, slice) in self.slices.iter().enumerate() {
                let y = 60 + idx as i32 * 24;
                let (r, g, b) = slice_color(idx);
                root.draw(&Rectangle::new(
                    [(legend_x, y - 7), (legend_x + 14, y + 7)],
                    RGBColor(r, g, b).filled(),
                ))
                .map_err(|e| anyhow!("chart legend draw failed: {e}"))?;
                root.draw(&Text::new(
                    slice.label.clone(),
                    (legend_x + 22, y),
                    legend_style.clone(),
                ))
                .map_err(|e| anyhow!("chart legend draw failed: {e}"))?;
            }

            root.present()
                .map_err(|e| anyhow!("chart svg present failed: {e}"))?;
        }
        Ok(svg)
    }

    fn draw_slices<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        center: (i32, i32),
        radius: i32,
    ) -> anyhow::Result<()> {
        let mut start = 0.0;
        for (idx, slice) in self.slices.iter().enumerate() {
            let sweep = slice.percent / 100.0 * 2.0 * PI;
            let steps = ((sweep / (2.0 * PI)) * ARC_STEPS as f64).ceil().max(1.0) as usize;

            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for i in 0..=steps {
                let angle = start + sweep * (i as f64 / steps as f64);
                points.push(polar(center, radius as f64, angle));
            }

            let (r, g, b) = slice_color(idx);
            root.draw(&Polygon::new(points, RGBColor(r, g, b).filled()))
                .map_err(|e| anyhow!("chart slice draw failed: {e}"))?;
            start += sweep;
        }
        Ok(())
    }
}

// Angle 0 points up; angles grow clockwise in screen coordinates.
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    let x = center.0 as f64 + radius * angle.sin();
    let y = center.1 as f64 - radius * angle.cos();
    (x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_positive_entries_and_keeps_order() {
        let chart = PieChart::from_amounts(
            "Income",
            [("Salary", 750.0), ("Rent", 0.0), ("Refund", -10.0), ("Other", 250.0)],
        )
        .unwrap();
        let labels: Vec<&str> = chart.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Salary", "Other"]);
        assert_eq!(chart.slices[0].percent, 75.0);
        assert_eq!(chart.slices[1].percent, 25.0);
    }

    #[test]
    fn all_zero_or_negative_yields_no_chart() {
        assert!(PieChart::from_amounts("Expenses", [("A", 0.0), ("B", -1.0)]).is_none());
        assert!(PieChart::from_amounts("Expenses", Vec::<(&str, f64)>::new()).is_none());
    }

    #[test]
    fn bitmap_rendering_is_deterministic() {
        let chart = PieChart::from_amounts("Income", [("A", 3.0), ("B", 1.0)]).unwrap();
        let a = chart.render_bitmap().unwrap();
        let b = chart.render_bitmap().unwrap();
        assert_eq!(a.width, BITMAP_SIZE);
        assert_eq!(a.rgb.len(), (BITMAP_SIZE * BITMAP_SIZE * 3) as usize);
        assert_eq!(a, b);

        // Corner stays background; a point inside the first slice takes the first color.
        assert_eq!(&a.rgb[0..3], &[255, 255, 255]);
        let (x, y) = (BITMAP_SIZE / 2 + 100, BITMAP_SIZE / 2);
        let at = ((y * BITMAP_SIZE + x) * 3) as usize;
        let (r, g, b) = slice_color(0);
        assert_eq!(&a.rgb[at..at + 3], &[r, g, b]);
    }

    #[test]
    fn svg_contains_percent_labels_and_legend() {
        let chart =
            PieChart::from_amounts("Activity", [("Generated", 3.0), ("Viewed", 1.0)]).unwrap();
        let svg = chart.render_svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("75.0%"));
        assert!(svg.contains("25.0%"));
        assert!(svg.contains("Generated"));
        assert_eq!(svg, chart.render_svg().unwrap());
    }

    #[test]
    fn single_slice_covers_full_circle() {
        let chart = PieChart::from_amounts("One", [("Only", 42.0)]).unwrap();
        assert_eq!(chart.slices[0].percent, 100.0);
        chart.render_bitmap().unwrap();
    }
}
