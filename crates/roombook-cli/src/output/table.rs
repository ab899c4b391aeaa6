use roombook_core::model::RoomReport;
use roombook_core::RunSummary;
use rust_decimal::Decimal;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Render a parsed report as aligned text, one block per room.
pub fn format_report(report: &RoomReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} (fiscal year {}) ===\n\n",
        report.source, report.fiscal_year
    ));
    out.push_str(&format!(
        "  {:<10} {:>8} {:>11} {:>14} {:>10}\n",
        "Month", "Arrivals", "Room Nights", "Room Revenue", "ADR"
    ));

    for record in &report.rooms {
        out.push_str(&format!("\n  Room {}\n", record.room));
        for entry in &record.months {
            out.push_str(&format!(
                "  {:<10} {:>8} {:>11} {:>14} {:>10}\n",
                entry.month.name(),
                opt(entry.arrivals),
                entry.nights,
                entry.revenue,
                opt(entry.adr)
            ));
        }
        let marker = if record.totals.reported { "" } else { " (computed)" };
        out.push_str(&format!(
            "  {:<10} {:>8} {:>11} {:>14} {:>10}{}\n",
            "Total",
            opt(record.totals.arrivals),
            record.totals.nights,
            record.totals.revenue,
            opt(record.totals.adr),
            marker
        ));
    }

    let revenue: Decimal = report.rooms.iter().map(|r| r.totals.revenue).sum();
    out.push_str(&format!(
        "\n  {} room(s), {} room-month(s), revenue {}\n",
        report.rooms.len(),
        report.month_count(),
        revenue
    ));

    if !report.skipped_lines.is_empty() {
        out.push_str(&format!(
            "\n  Skipped lines ({}):\n",
            report.skipped_lines.len()
        ));
        for skipped in &report.skipped_lines {
            out.push_str(&format!(
                "    {:?}: {}\n",
                skipped.line_text.trim(),
                skipped.reason
            ));
        }
    }

    out
}

pub fn print_summary(summary: &RunSummary) {
    println!(
        "Reports found: {}  parsed: {}  without tables: {}  failed: {}",
        summary.reports_found,
        summary.parsed.len(),
        summary.empty.len(),
        summary.failed.len()
    );

    if !summary.empty.is_empty() {
        println!("\nNo room table data:");
        for name in &summary.empty {
            println!("  {name}");
        }
    }

    if !summary.failed.is_empty() {
        println!("\nFailed:");
        let width = summary
            .failed
            .iter()
            .map(|f| f.file.len())
            .max()
            .unwrap_or(10);
        for failed in &summary.failed {
            println!("  {:<width$}  {}", failed.file, failed.reason, width = width);
        }
    }

    println!("\nWorkbooks:");
    for (year, path) in summary.years.iter().zip(&summary.workbooks) {
        println!("  {year}  {}", path.display());
    }
}
