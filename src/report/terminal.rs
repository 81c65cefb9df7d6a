use std::collections::HashMap;
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::license::classify;
use crate::models::{LicenseKind, LicenseRecord, LicenseRisk};

/// Print the run summary and the license table.
pub fn render(
    records: &[LicenseRecord],
    missing: &[String],
    path: &Path,
    add_version_numbers: bool,
) {
    let count = |kind: LicenseKind| records.iter().filter(|r| r.kind == kind).count();

    println!(
        "\n {} v{}",
        "license-plist".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Project: {}\n", path.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total licenses : {}", records.len()));
    println!(" │  {:<48} │", format!("CocoaPods      : {:>4}", count(LicenseKind::CocoaPods)));
    println!(" │  {:<48} │", format!("GitHub         : {:>4}", count(LicenseKind::GitHub)));
    println!(" │  {:<48} │", format!("Manual         : {:>4}", count(LicenseKind::Manual)));
    println!(" │  {:<48} │", format!("Missing        : {:>4}", missing.len()));
    println!(" │  {:<48} │", summarize_licenses(records));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !records.is_empty() {
        render_table(records, add_version_numbers);
        println!();
    }

    if !missing.is_empty() {
        println!(" {} Libraries without a license:\n", "[MISSING]".red().bold());
        for name in missing {
            println!("   {} {}", "✗".red(), name);
        }
        println!();
    }
}

fn render_table(records: &[LicenseRecord], add_version_numbers: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
        ]);

    for record in records {
        let (license, risk) = classify(&record.body);

        let risk_color = match risk {
            LicenseRisk::Permissive => Color::Green,
            LicenseRisk::WeakCopyleft => Color::Yellow,
            LicenseRisk::StrongCopyleft => Color::Red,
            LicenseRisk::Proprietary => Color::Magenta,
            LicenseRisk::Unknown => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(record.title(add_version_numbers)),
            Cell::new(record.kind.to_string()),
            Cell::new(license.unwrap_or("unknown")),
            Cell::new(risk.to_string()).fg(risk_color),
        ]);
    }

    println!("{}", table);
}

/// Top three identified licenses, e.g. `MIT (12), Apache-2.0 (3)`.
fn summarize_licenses(records: &[LicenseRecord]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let (license, _) = classify(&record.body);
        *counts.entry(license.unwrap_or("unknown")).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> LicenseRecord {
        LicenseRecord {
            name: "x".into(),
            version: None,
            body: body.into(),
            kind: LicenseKind::GitHub,
            source_url: None,
        }
    }

    #[test]
    fn test_summarize_licenses() {
        let mit = "Permission is hereby granted, free of charge";
        let records = vec![record(mit), record(mit), record("custom")];
        assert_eq!(summarize_licenses(&records), "MIT (2), unknown (1)");
    }
}
