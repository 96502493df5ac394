use crate::activity::ActivityRecord;
use crate::chart::PieChart;
use anyhow::Context;
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook};
use std::collections::HashMap;
use std::fmt::Write as _;

pub const RECORDS_SHEET: &str = "Activity";
pub const SUMMARY_SHEET: &str = "Summary";
pub const COLUMNS: [&str; 3] = ["Client", "Action", "Timestamp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCount {
    pub action: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityReport {
    /// File order.
    pub records: Vec<ActivityRecord>,
    /// Most frequent first; ties broken by action name.
    pub counts: Vec<ActionCount>,
}

impl ActivityReport {
    pub fn from_records(records: Vec<ActivityRecord>) -> Self {
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for r in &records {
            *tally.entry(r.action.as_str()).or_default() += 1;
        }
        let mut counts: Vec<ActionCount> = tally
            .into_iter()
            .map(|(action, count)| ActionCount {
                action: action.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.action.cmp(&b.action)));

        Self { records, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn pie_chart(&self) -> Option<PieChart> {
        PieChart::from_amounts(
            "Activity by Action",
            self.counts.iter().map(|c| (c.action.as_str(), c.count as f64)),
        )
    }

    /// Full record table followed by nothing else; callers wrap it in a page.
    pub fn html_table(&self) -> String {
        let mut out = String::from("<table class=\"table\">\n<thead><tr>");
        for col in COLUMNS {
            let _ = write!(out, "<th>{col}</th>");
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for r in &self.records {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&r.actor),
                escape_html(&r.action),
                escape_html(&r.timestamp)
            );
        }
        out.push_str("</tbody>\n</table>");
        out
    }

    pub fn html_summary(&self) -> String {
        let mut out = String::from(
            "<table class=\"table summary\">\n<thead><tr><th>Action</th><th>Count</th></tr></thead>\n<tbody>\n",
        );
        for c in &self.counts {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&c.action),
                c.count
            );
        }
        out.push_str("</tbody>\n</table>");
        out
    }

    /// Workbook with the raw records and a summary sheet carrying a column chart of the counts.
    pub fn to_xlsx(&self) -> anyhow::Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(RECORDS_SHEET)?;
            for (col, name) in COLUMNS.iter().enumerate() {
                sheet.write_string_with_format(0, col as u16, *name, &header)?;
            }
            for (idx, r) in self.records.iter().enumerate() {
                let row = idx as u32 + 1;
                sheet.write_string(row, 0, xlsx_cell(&r.actor))?;
                sheet.write_string(row, 1, xlsx_cell(&r.action))?;
                sheet.write_string(row, 2, xlsx_cell(&r.timestamp))?;
            }
            sheet.set_column_width(0, 28)?;
            sheet.set_column_width(1, 18)?;
            sheet.set_column_width(2, 22)?;
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SUMMARY_SHEET)?;
            sheet.write_string_with_format(0, 0, "Action", &header)?;
            sheet.write_string_with_format(0, 1, "Count", &header)?;
            for (idx, c) in self.counts.iter().enumerate() {
                let row = idx as u32 + 1;
                sheet.write_string(row, 0, xlsx_cell(&c.action))?;
                sheet.write_number(row, 1, c.count as f64)?;
            }
            sheet.set_column_width(0, 18)?;

            if !self.counts.is_empty() {
                let last = self.counts.len() as u32;
                let mut chart = Chart::new(ChartType::Column);
                chart.title().set_name("Activity by Action");
                chart.legend().set_hidden();
                chart
                    .add_series()
                    .set_name("Count")
                    .set_categories((SUMMARY_SHEET, 1, 0, last, 0))
                    .set_values((SUMMARY_SHEET, 1, 1, last, 1));
                sheet.insert_chart(1, 3, &chart)?;
            }
        }

        workbook
            .save_to_buffer()
            .context("failed to serialize activity workbook")
    }
}

// Excel refuses longer cell text.
const XLSX_MAX_CELL_CHARS: usize = 32_767;

/// Clips text to what a single worksheet cell accepts, on a char boundary.
fn xlsx_cell(s: &str) -> &str {
    match s.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
