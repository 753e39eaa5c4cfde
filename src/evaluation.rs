//! Reference data for evaluating TAP solvers.
//!
//! Three `;`-delimited files with one header line each:
//! - instance specs: `instance;epsilon_time;epsilon_distance`
//! - optimal values: `instance;value`, a trailing `*` marks a value that is
//!   only a bound (not proven optimal)
//! - baseline values: `instance;value`
//!
//! Malformed lines are logged and skipped; a missing file is an error.

use crate::error::{Result, TapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An instance file together with its budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub filename: String,
    pub epsilon_time: f64,
    pub epsilon_distance: f64,
}

/// A reference objective value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEntry {
    pub value: f64,
    /// `false` when the value is only the best known bound
    pub is_optimal: bool,
}

fn semicolon_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Yield `(line, fields)` for every readable record, skipping broken ones
fn records<R: Read>(reader: R, source: &str) -> Vec<(u64, csv::StringRecord)> {
    let mut out = Vec::new();
    for result in semicolon_reader(reader).records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                out.push((line, record));
            }
            Err(e) => log::warn!("{}: skipping unreadable line: {}", source, e),
        }
    }
    out
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    field.filter(|s| !s.is_empty())?.parse().ok()
}

/// Parse instance specs from any reader
pub fn read_instance_specs<R: Read>(reader: R, source: &str) -> Vec<InstanceSpec> {
    let mut specs = Vec::new();
    for (line, record) in records(reader, source) {
        let filename = match record.get(0).filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("{}:{}: missing instance name", source, line);
                continue;
            }
        };
        let Some(epsilon_time) = parse_number(record.get(1)) else {
            log::warn!("{}:{}: missing or invalid time epsilon for '{}'", source, line, filename);
            continue;
        };
        let Some(epsilon_distance) = parse_number(record.get(2)) else {
            log::warn!("{}:{}: missing or invalid distance epsilon for '{}'", source, line, filename);
            continue;
        };
        specs.push(InstanceSpec {
            filename,
            epsilon_time,
            epsilon_distance,
        });
    }
    specs
}

/// Parse optimal values from any reader
pub fn read_optimal_values<R: Read>(reader: R, source: &str) -> HashMap<String, EvaluationEntry> {
    let mut values = HashMap::new();
    for (line, record) in records(reader, source) {
        let (Some(name), Some(raw)) = (record.get(0), record.get(1)) else {
            log::warn!("{}:{}: malformed line", source, line);
            continue;
        };
        let (raw, is_optimal) = match raw.strip_suffix('*') {
            Some(stripped) => (stripped.trim(), false),
            None => (raw, true),
        };
        match raw.parse::<f64>() {
            Ok(value) => {
                values.insert(name.to_string(), EvaluationEntry { value, is_optimal });
            }
            Err(_) => log::warn!("{}:{}: invalid value '{}' for '{}'", source, line, raw, name),
        }
    }
    values
}

/// Parse baseline values from any reader
pub fn read_baseline_values<R: Read>(reader: R, source: &str) -> HashMap<String, f64> {
    let mut values = HashMap::new();
    for (line, record) in records(reader, source) {
        let Some(name) = record.get(0).filter(|s| !s.is_empty()) else {
            log::warn!("{}:{}: missing instance name", source, line);
            continue;
        };
        match parse_number(record.get(1)) {
            Some(value) => {
                values.insert(name.to_string(), value);
            }
            None => log::warn!("{}:{}: missing or invalid baseline for '{}'", source, line, name),
        }
    }
    values
}

fn open(path: &Path) -> Result<File> {
    Ok(File::open(path)?)
}

/// Load the instance specs file
pub fn load_instance_specs<P: AsRef<Path>>(path: P) -> Result<Vec<InstanceSpec>> {
    let path = path.as_ref();
    let specs = read_instance_specs(open(path)?, &path.display().to_string());
    log::info!("Loaded {} instance specs from {}", specs.len(), path.display());
    Ok(specs)
}

/// Load the optimal values file
pub fn load_optimal_values<P: AsRef<Path>>(path: P) -> Result<HashMap<String, EvaluationEntry>> {
    let path = path.as_ref();
    Ok(read_optimal_values(open(path)?, &path.display().to_string()))
}

/// Load the baseline values file
pub fn load_baseline_values<P: AsRef<Path>>(path: P) -> Result<HashMap<String, f64>> {
    let path = path.as_ref();
    Ok(read_baseline_values(open(path)?, &path.display().to_string()))
}

/// One line of the comparison table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub instance: String,
    pub score: f64,
    pub baseline: f64,
    pub optimal: f64,
    pub is_optimal: bool,
    /// `100 * (baseline - score) / optimal`, negative when the score beats the baseline
    pub gap_baseline: f64,
    /// `100 * (optimal - score) / optimal`
    pub gap_optimal: f64,
}

impl ComparisonRow {
    /// Gaps are relative to the optimal value; an optimal value of 0 yields 0 gaps.
    pub fn new(instance: impl Into<String>, score: f64, baseline: f64, optimal: EvaluationEntry) -> Self {
        let gap = |reference: f64| {
            if optimal.value == 0.0 {
                0.0
            } else {
                100.0 * (reference - score) / optimal.value
            }
        };
        ComparisonRow {
            instance: instance.into(),
            score,
            baseline,
            optimal: optimal.value,
            is_optimal: optimal.is_optimal,
            gap_baseline: gap(baseline),
            gap_optimal: gap(optimal.value),
        }
    }
}

/// Build the row for one instance, failing if a reference value is missing
pub fn comparison_row(
    instance: &str,
    score: f64,
    baseline: &HashMap<String, f64>,
    optimal: &HashMap<String, EvaluationEntry>,
) -> Result<ComparisonRow> {
    let base = baseline
        .get(instance)
        .ok_or_else(|| TapError::MissingReference(instance.to_string()))?;
    let opt = optimal
        .get(instance)
        .ok_or_else(|| TapError::MissingReference(instance.to_string()))?;
    Ok(ComparisonRow::new(instance, score, *base, *opt))
}

/// Rows for every scored instance that has both reference values, sorted by name
pub fn comparison_rows(
    scores: &HashMap<String, f64>,
    baseline: &HashMap<String, f64>,
    optimal: &HashMap<String, EvaluationEntry>,
) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = scores
        .iter()
        .filter_map(|(name, &score)| match comparison_row(name, score, baseline, optimal) {
            Ok(row) => Some(row),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        })
        .collect();
    rows.sort_by(|a, b| a.instance.cmp(&b.instance));
    rows
}

/// Render rows as a fixed-width table
pub fn format_comparison_table(rows: &[ComparisonRow], algorithm_name: &str) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:>20}{:>12}{:>12}{:>12}{:>12}{:>12}\n",
        "Instance", algorithm_name, "Baseline", "Optimal", "GapBase(%)", "GapOpt(%)"
    ));
    for row in rows {
        let optimal = if row.is_optimal {
            format!("{:.2}", row.optimal)
        } else {
            format!("{:.2}*", row.optimal)
        };
        table.push_str(&format!(
            "{:>20}{:>12.2}{:>12.2}{:>12}{:>12.2}{:>12.2}\n",
            row.instance, row.score, row.baseline, optimal, row.gap_baseline, row.gap_optimal
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: f64, is_optimal: bool) -> EvaluationEntry {
        EvaluationEntry { value, is_optimal }
    }

    #[test]
    fn test_read_instance_specs_skips_malformed() {
        let text = "instance;epsilon_time;epsilon_distance\n\
                    tap_1_20.dat; 25 ; 35\n\
                    tap_2_20.dat;25\n\
                    tap_3_20.dat;abc;35\n\
                    tap_4_100.dat;150;350.5\n";
        let specs = read_instance_specs(text.as_bytes(), "specs");

        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[0],
            InstanceSpec {
                filename: "tap_1_20.dat".to_string(),
                epsilon_time: 25.0,
                epsilon_distance: 35.0,
            }
        );
        assert_eq!(specs[1].epsilon_distance, 350.5);
    }

    #[test]
    fn test_read_optimal_values_star_suffix() {
        let text = "instance;value\na.dat;120\nb.dat;98.5*\nc.dat;oops\nd.dat\n";
        let values = read_optimal_values(text.as_bytes(), "opt");

        assert_eq!(values.len(), 2);
        assert_eq!(values["a.dat"], entry(120.0, true));
        assert_eq!(values["b.dat"], entry(98.5, false));
    }

    #[test]
    fn test_read_baseline_values() {
        let text = "instance;value\na.dat;80\nb.dat;\n";
        let values = read_baseline_values(text.as_bytes(), "baseline");
        assert_eq!(values.len(), 1);
        assert_eq!(values["a.dat"], 80.0);
    }

    #[test]
    fn test_load_from_files() {
        let path = std::env::temp_dir().join(format!("tap_specs_{}.txt", std::process::id()));
        std::fs::write(&path, "instance;et;ed\nx.dat;1;2\n").unwrap();
        let specs = load_instance_specs(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(specs.len(), 1);
        assert!(load_optimal_values("/definitely/not/here.txt").is_err());
        assert!(load_baseline_values("/definitely/not/here.txt").is_err());
    }

    #[test]
    fn test_comparison_row_gaps() {
        let row = ComparisonRow::new("a.dat", 90.0, 80.0, entry(100.0, true));
        assert!((row.gap_baseline - (-10.0)).abs() < 1e-9);
        assert!((row.gap_optimal - 10.0).abs() < 1e-9);

        let zero = ComparisonRow::new("z.dat", 0.0, 0.0, entry(0.0, true));
        assert_eq!(zero.gap_optimal, 0.0);
    }

    #[test]
    fn test_comparison_rows_skip_missing_and_sort() {
        let scores = HashMap::from([
            ("b.dat".to_string(), 50.0),
            ("a.dat".to_string(), 40.0),
            ("c.dat".to_string(), 10.0),
        ]);
        let baseline = HashMap::from([("a.dat".to_string(), 30.0), ("b.dat".to_string(), 45.0)]);
        let optimal = HashMap::from([
            ("a.dat".to_string(), entry(40.0, true)),
            ("b.dat".to_string(), entry(60.0, false)),
            ("c.dat".to_string(), entry(20.0, true)),
        ]);

        let rows = comparison_rows(&scores, &baseline, &optimal);
        let names: Vec<&str> = rows.iter().map(|r| r.instance.as_str()).collect();
        assert_eq!(names, vec!["a.dat", "b.dat"]);

        assert!(matches!(
            comparison_row("c.dat", 10.0, &baseline, &optimal),
            Err(TapError::MissingReference(name)) if name == "c.dat"
        ));
    }

    #[test]
    fn test_format_comparison_table() {
        let rows = vec![
            ComparisonRow::new("a.dat", 40.0, 30.0, entry(40.0, true)),
            ComparisonRow::new("b.dat", 50.0, 45.0, entry(60.0, false)),
        ];
        let table = format_comparison_table(&rows, "Greedy");
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Greedy"));
        assert!(lines[1].contains("40.00"));
        assert!(lines[2].contains("60.00*"));
        assert!(!lines[1].contains('*'));
    }
}
