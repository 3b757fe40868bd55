use crate::output::{print_json, Table};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use usersync_core::{loader, Action};

#[derive(Serialize)]
struct RejectedRow<'a> {
    line: u64,
    message: &'a str,
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    headerless: bool,
    add: usize,
    remove: usize,
    rejected: Vec<RejectedRow<'a>>,
}

/// Load the CSV without touching the API and report what would be processed.
pub fn run(csv_file: &Path, json: bool) -> anyhow::Result<()> {
    let report = loader::load_path(csv_file)
        .with_context(|| format!("invalid or empty CSV file: {}", csv_file.display()))?;

    let adds = report
        .directives
        .iter()
        .filter(|d| d.action() == Action::Add)
        .count();
    let removes = report.directives.len() - adds;

    if json {
        return print_json(&ValidateOutput {
            headerless: report.headerless,
            add: adds,
            remove: removes,
            rejected: report
                .rejected
                .iter()
                .map(|r| RejectedRow {
                    line: r.line,
                    message: &r.message,
                })
                .collect(),
        });
    }

    if !report.rejected.is_empty() {
        let mut table = Table::new(&["LINE", "REJECTED"]);
        for r in &report.rejected {
            table.row([r.line.to_string(), r.message.clone()]);
        }
        table.print();
        println!();
    }
    println!(
        "{} valid row(s): {adds} add, {removes} remove; {} rejected",
        report.directives.len(),
        report.rejected.len()
    );
    if report.headerless {
        println!("note: no header row found, columns were read by position");
    }
    Ok(())
}
