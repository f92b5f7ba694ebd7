mod violation;

pub use violation::{Severity, Violation, ViolationLocation};

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

/// Violations from a single analyzer run, counted and ordered by severity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Results {
    total_violations: usize,
    violation_counts: [usize; 5],
    violations: Vec<Violation>,
}

impl Results {
    pub fn new(mut violations: Vec<Violation>) -> Self {
        // Stable: equal severity and location keep input order
        violations.sort_by(Violation::severity_order);

        let mut violation_counts = [0; 5];
        for violation in &violations {
            violation_counts[violation.severity.index()] += 1;
        }

        Self {
            total_violations: violations.len(),
            violation_counts,
            violations,
        }
    }

    pub fn violation_count(&self, severity: Severity) -> usize {
        self.violation_counts[severity.index()]
    }

    pub fn total_violation_count(&self) -> usize {
        self.total_violations
    }

    pub fn violations_sorted_by_severity(&self) -> &[Violation] {
        &self.violations
    }
}

/// Builds [`Results`] from a results file
pub trait ResultsFactory: Send + Sync {
    fn create_results(&self, results_file: &str) -> Result<Results, PipelineError>;
}

/// Reads the JSON written by `sf scanner run --format json --normalize-severity`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResultsFactory;

impl ResultsFactory for JsonResultsFactory {
    fn create_results(&self, results_file: &str) -> Result<Results, PipelineError> {
        debug!("Reading results from {}", results_file);
        let content =
            fs::read_to_string(results_file).map_err(|e| PipelineError::parse(results_file, e))?;
        let results = parse_results(&content, results_file)?;
        info!(
            "Parsed {} violations from {}",
            results.total_violation_count(),
            results_file
        );
        Ok(results)
    }
}

/// Per-file entry in the analyzer's JSON output
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    #[serde(default)]
    engine: String,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    violations: Vec<RawViolation>,
}

/// Positions and severities arrive as numbers or numeric strings depending on the engine
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawViolation {
    #[serde(default)]
    rule_name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "sourceLine")]
    line: Option<Value>,
    #[serde(default, alias = "sourceColumn")]
    column: Option<Value>,
    #[serde(default)]
    normalized_severity: Option<Value>,
    #[serde(default)]
    severity: Option<Value>,
}

fn parse_results(content: &str, path: &str) -> Result<Results, PipelineError> {
    if content.trim().is_empty() {
        return Ok(Results::default());
    }

    let entries: Vec<FileEntry> =
        serde_json::from_str(content).map_err(|e| PipelineError::parse(path, e))?;

    let mut violations = Vec::new();
    for entry in entries {
        for raw in entry.violations {
            let violation = raw
                .into_violation(&entry.engine, &entry.file_name)
                .map_err(|reason| PipelineError::parse(path, reason))?;
            violations.push(violation);
        }
    }

    Ok(Results::new(violations))
}

impl RawViolation {
    fn into_violation(self, engine: &str, file: &str) -> Result<Violation, String> {
        let raw_severity = self
            .normalized_severity
            .or(self.severity)
            .ok_or_else(|| format!("violation of rule '{}' has no severity", self.rule_name))?;
        let severity = integer(&raw_severity)
            .and_then(Severity::new)
            .ok_or_else(|| {
                format!(
                    "severity {} of rule '{}' in {} is not an integer between {} and {}",
                    raw_severity,
                    self.rule_name,
                    file,
                    Severity::MOST_SEVERE,
                    Severity::LEAST_SEVERE
                )
            })?;

        Ok(Violation {
            severity,
            location: ViolationLocation::new(
                file,
                position(self.line.as_ref(), "line")?,
                position(self.column.as_ref(), "column")?,
            ),
            rule: self.rule_name,
            engine: engine.to_string(),
            category: self.category,
            message: self.message.trim().to_string(),
            url: self.url.filter(|u| !u.is_empty()),
        })
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Missing positions default to 0
fn position(value: Option<&Value>, name: &str) -> Result<u32, String> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => integer(v)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("invalid {} {}", name, v)),
    }
}
