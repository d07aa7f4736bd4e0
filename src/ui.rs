//! Terminal output — progress bar and colored run summary.
//!
//! Uses `indicatif` for the fan-out progress bar and `console` for styled
//! completion output. Structured logging is tracing's job; this module is
//! only the human-facing rendering.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::pipeline::{RunRecord, UnitOutcome, UnitReport};

/// Visual progress for one pipeline run.
pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Starts a bar sized to the number of launched work items.
    pub fn start(total: u64) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30}] {pos}/{len} users")
                .expect("invalid template"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self::with_bar(pb)
    }

    /// A progress handle that renders nothing. Used by tests.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(pb: ProgressBar) -> Self {
        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Advances the bar for one settled unit, flagging failures inline.
    pub fn unit_settled(&self, report: &UnitReport) {
        match &report.outcome {
            UnitOutcome::Succeeded => {}
            UnitOutcome::TimedOut => {
                self.pb.println(format!(
                    "  {} user {} timed out after {} attempt(s)",
                    self.yellow.apply_to("⏱"),
                    report.id,
                    report.attempts
                ));
            }
            UnitOutcome::Failed(message) => {
                self.pb.println(format!(
                    "  {} user {} failed: {message}",
                    self.red.apply_to("✗"),
                    report.id
                ));
            }
        }
        self.pb.inc(1);
    }

    /// Clears the bar and prints the completion record.
    pub fn complete(&self, record: &RunRecord) {
        self.pb.finish_and_clear();

        let status = if record.succeeded == record.total {
            &self.green
        } else if record.succeeded > 0 {
            &self.yellow
        } else {
            &self.red
        };

        println!();
        println!("{}", status.apply_to("─── Run Summary ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}

/// Candidate columns for the saved-results table. `company` drills into the
/// nested company object's name, matching the upstream payload shape.
const TABLE_COLUMNS: &[&str] = &["id", "name", "email", "company"];

/// Prints previously saved results as an aligned table.
pub fn print_results_table(records: &[Value]) {
    let columns: Vec<&str> = TABLE_COLUMNS
        .iter()
        .copied()
        .filter(|col| *col == "id" || records.iter().any(|r| column_value(r, col).is_some()))
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cell = column_value(record, col).unwrap_or_else(|| "-".to_string());
                    widths[i] = widths[i].max(cell.len());
                    cell
                })
                .collect()
        })
        .collect();

    let header = Style::new().bold();
    let line: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{:width$}", col, width = widths[i]))
        .collect();
    println!("{}", header.apply_to(line.join("  ")));
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * (columns.len() - 1)));

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect();
        println!("{}", cells.join("  "));
    }
}

/// Extracts a displayable cell from a result record.
fn column_value(record: &Value, column: &str) -> Option<String> {
    let value = if column == "company" {
        record.get("company")?.get("name")?
    } else {
        record.get(column)?
    };
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_value_reads_scalars() {
        let record = json!({"id": 7, "name": "Alice"});
        assert_eq!(column_value(&record, "id").unwrap(), "7");
        assert_eq!(column_value(&record, "name").unwrap(), "Alice");
        assert_eq!(column_value(&record, "email"), None);
    }

    #[test]
    fn column_value_drills_into_company_name() {
        let record = json!({"id": 1, "company": {"name": "Acme"}});
        assert_eq!(column_value(&record, "company").unwrap(), "Acme");

        let flat = json!({"id": 1, "company": "raw"});
        assert_eq!(column_value(&flat, "company"), None);
    }

    #[test]
    fn column_value_treats_null_as_absent() {
        let record = json!({"id": 1, "email": null});
        assert_eq!(column_value(&record, "email"), None);
    }
}
