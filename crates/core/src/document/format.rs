/// Two decimals with comma thousands separators: `1234567.891` -> `1,234,567.89`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to 0.00 and should not print a sign.
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

const FALLBACK_FILENAME: &str = "client_summary.pdf";
const FILENAME_SUFFIX: &str = "_summary.pdf";

/// Attachment name for a client's report: spaces become underscores, letters and digits in any
/// script are kept, anything unsafe in a header or a path is dropped.
pub fn document_filename(client_name: &str) -> String {
    let stem: String = client_name
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    with_suffix(stem.trim_start_matches(['.', '_']).trim_end_matches('_'))
}

/// ASCII-only form of a document filename for clients that ignore `filename*`.
pub fn ascii_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(FILENAME_SUFFIX).unwrap_or(filename);
    let ascii: String = stem.chars().filter(char::is_ascii).collect();
    with_suffix(ascii.trim_start_matches(['.', '_']).trim_end_matches('_'))
}

fn with_suffix(stem: &str) -> String {
    if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        format!("{stem}{FILENAME_SUFFIX}")
    }
}

pub fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}

/// Greedy word wrap on character counts. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                lines.push(head);
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_grouping_and_two_decimals() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(5.5), "5.50");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(100000.0), "100,000.00");
        assert_eq!(format_amount(-2500.0), "-2,500.00");
        assert_eq!(format_amount(-0.001), "0.00");
        assert_eq!(format_amount(f64::NAN), "0.00");
    }

    #[test]
    fn filename_replaces_spaces_and_strips_unsafe_chars() {
        assert_eq!(document_filename("Asha Rao"), "Asha_Rao_summary.pdf");
        assert_eq!(document_filename("  O'Neil \"Jr\" "), "ONeil_Jr_summary.pdf");
        assert_eq!(document_filename("../etc"), "etc_summary.pdf");
        assert_eq!(document_filename(""), "client_summary.pdf");
        assert_eq!(document_filename("!! ??"), "client_summary.pdf");
    }

    #[test]
    fn filename_keeps_letters_from_any_script() {
        assert_eq!(document_filename("José"), "José_summary.pdf");
        assert_eq!(
            document_filename("आशा राव José"),
            "आशा_राव_José_summary.pdf"
        );
        assert_eq!(document_filename("  (Asha) Rao"), "Asha_Rao_summary.pdf");
    }

    #[test]
    fn ascii_filename_drops_non_ascii_letters() {
        assert_eq!(ascii_filename("Asha_Rao_summary.pdf"), "Asha_Rao_summary.pdf");
        assert_eq!(ascii_filename("आशा_राव_José_summary.pdf"), "Jos_summary.pdf");
        assert_eq!(ascii_filename("आशा_summary.pdf"), "client_summary.pdf");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("save more and spend less every month", 12);
        assert_eq!(lines, vec!["save more", "and spend", "less every", "month"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
