use serde::Serialize;
use usersync_core::executor::OutcomeCounts;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Plain-text table. Columns whose every cell is numeric are right-aligned.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: impl IntoIterator<Item = String>) -> &mut Self {
        self.rows.push(cells.into_iter().collect());
        self
    }

    pub fn render(&self) -> String {
        let cols = self.headers.len();

        let widths: Vec<usize> = (0..cols)
            .map(|i| {
                self.rows
                    .iter()
                    .map(|r| cell(r, i).len())
                    .fold(self.headers[i].len(), usize::max)
            })
            .collect();
        let numeric: Vec<bool> = (0..cols)
            .map(|i| {
                !self.rows.is_empty()
                    && self
                        .rows
                        .iter()
                        .all(|r| cell(r, i).parse::<u64>().is_ok())
            })
            .collect();

        let line = |cells: Vec<&str>| {
            let padded: Vec<String> = cells
                .into_iter()
                .zip(widths.iter().zip(&numeric))
                .map(|(c, (&w, &right))| {
                    if right {
                        format!("{c:>w$}")
                    } else {
                        format!("{c:<w$}")
                    }
                })
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut out = vec![line(self.headers.clone())];
        out.push(
            widths
                .iter()
                .map(|&w| "-".repeat(w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            out.push(line((0..cols).map(|i| cell(row, i)).collect()));
        }
        out.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn cell(row: &[String], i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

pub fn print_counts(counts: &OutcomeCounts) {
    let mut table = Table::new(&["OUTCOME", "COUNT"]);
    for (label, n) in [
        ("added", counts.added),
        ("updated", counts.updated),
        ("removed", counts.removed),
        ("skipped-not-found", counts.skipped_not_found),
        ("failed", counts.failed),
    ] {
        table.row([label.to_string(), n.to_string()]);
    }
    table.print();
}
