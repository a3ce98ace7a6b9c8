use anyhow::Result;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use super::{LibraryReport, Outcome};

/// Render a colored terminal report.
pub fn render(reports: &[LibraryReport], verbose: bool, quiet: bool) -> Result<()> {
    let total = reports.len();
    let resolved = reports.iter().filter(|r| !r.failed()).count();
    let unlicensed = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Unlicensed))
        .count();
    let failed = total - resolved - unlicensed;

    if quiet {
        println!(
            "Total: {}  Resolved: {}  Unlicensed: {}  Failed: {}",
            total,
            resolved.to_string().green(),
            unlicensed.to_string().yellow(),
            failed.to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "modlicense".bold(), env!("CARGO_PKG_VERSION"));
    println!(
        " {} libraries: {} resolved, {} unlicensed, {} failed\n",
        total,
        resolved.to_string().green(),
        unlicensed.to_string().yellow(),
        failed.to_string().red(),
    );

    let failures: Vec<&LibraryReport> = reports.iter().filter(|r| r.failed()).collect();
    if !failures.is_empty() {
        println!(
            " {} Libraries requiring attention:\n",
            "[FAIL]".red().bold()
        );
        render_table(&failures);
        println!();
    }

    if verbose && resolved > 0 {
        let ok: Vec<&LibraryReport> = reports.iter().filter(|r| !r.failed()).collect();
        println!(" {} Resolved libraries:\n", "[OK]".green().bold());
        render_table(&ok);
        println!();
    }

    Ok(())
}

fn render_table(reports: &[&LibraryReport]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Library").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("URL / Error").add_attribute(Attribute::Bold),
        ]);

    for report in reports {
        let (detail, color) = match &report.outcome {
            Outcome::Resolved { url } => (url.clone(), Color::Green),
            Outcome::Unlicensed => ("no license file found".to_string(), Color::Yellow),
            Outcome::Failed { error } => (error.clone(), Color::Red),
        };
        table.add_row(vec![
            Cell::new(&report.name),
            Cell::new(if report.version.is_empty() {
                "(devel)"
            } else {
                &report.version
            }),
            Cell::new(report.spdx_id.as_deref().unwrap_or("Unknown")),
            Cell::new(detail).fg(color),
        ]);
    }

    println!("{}", table);
}
