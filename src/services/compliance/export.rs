// Report Export
// CSV rendering of section analyses, one row per statute section

use crate::models::SectionAnalysis;
use std::fs;
use std::path::Path;

/// Column order matches the analysis reply fields.
const CSV_HEADER: [&str; 7] = [
    "DPDPA Section",
    "Matched Policy Snippets",
    "Match Level",
    "Severity",
    "Compliance Points",
    "Justification",
    "Suggested Rewrite",
];

/// Quote a field when it contains a separator, a quote, or a line break;
/// embedded quotes are doubled (RFC 4180).
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the analyses as CSV text, header row first.
pub fn section_report_csv(analyses: &[SectionAnalysis]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push_str("\r\n");

    for analysis in analyses {
        let points = format!("{}", analysis.compliance_points);
        let row = [
            analysis.section.as_str(),
            analysis.matched_snippets.as_str(),
            analysis.match_level.as_str(),
            analysis.severity.as_str(),
            points.as_str(),
            analysis.justification.as_str(),
            analysis.suggested_rewrite.as_str(),
        ];
        let rendered = row.map(csv_field);
        out.push_str(&rendered.join(","));
        out.push_str("\r\n");
    }

    out
}

/// Write the CSV report to disk.
pub fn write_section_csv(path: &Path, analyses: &[SectionAnalysis]) -> Result<(), String> {
    fs::write(path, section_report_csv(analyses))
        .map_err(|e| format!("Failed to write CSV report {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> SectionAnalysis {
        SectionAnalysis {
            section: "Section 5 \u{2014} Notice".to_string(),
            matched_snippets: "We say \"we will notify you\", always.".to_string(),
            match_level: "Partially Compliant".to_string(),
            severity: "Minor".to_string(),
            compliance_points: 0.75,
            justification: "Notice exists,\nbut lacks purposes.".to_string(),
            suggested_rewrite: "List each purpose.".to_string(),
        }
    }

    #[test]
    fn test_header_matches_wire_fields() {
        let csv = section_report_csv(&[]);
        assert_eq!(
            csv,
            "DPDPA Section,Matched Policy Snippets,Match Level,Severity,Compliance Points,Justification,Suggested Rewrite\r\n"
        );
    }

    #[test]
    fn test_row_quoting_and_escaping() {
        let csv = section_report_csv(&[analysis()]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        // Justification embeds a newline, so the logical row spans physical lines.
        assert!(lines[1].contains("\"We say \"\"we will notify you\"\", always.\""));
        assert!(csv.contains("\"Notice exists,\nbut lacks purposes.\""));
        assert!(csv.contains("0.75"));
    }

    #[test]
    fn test_plain_fields_left_unquoted() {
        let mut row = analysis();
        row.matched_snippets = "No matching text found.".to_string();
        row.justification = "Nothing relevant.".to_string();
        let csv = section_report_csv(&[row]);
        assert!(csv.contains("No matching text found.,Partially Compliant,Minor,0.75,Nothing relevant.,List each purpose."));
    }
}
