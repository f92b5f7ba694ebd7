use crate::results::{Results, Severity, Violation};
use anyhow::{Context, bail};
use tracing::info;

const SUMMARY_TITLE: &str = "## Salesforce Code Analyzer Results";

/// Renders aggregated results for a human reader
pub trait Summarizer: Send + Sync {
    fn create_summary_markdown(&self, results: &Results) -> String;
}

/// GitHub-flavored markdown with a count table and a violations table
#[derive(Debug, Clone)]
pub struct MarkdownSummarizer {
    max_violation_rows: usize,
}

impl MarkdownSummarizer {
    pub fn new(max_violation_rows: usize) -> Self {
        Self { max_violation_rows }
    }
}

impl Summarizer for MarkdownSummarizer {
    fn create_summary_markdown(&self, results: &Results) -> String {
        let total = results.total_violation_count();
        let mut output = format!("{}\n\n", SUMMARY_TITLE);

        if total == 0 {
            output.push_str("No violations found.\n");
            return output;
        }

        output.push_str(&format!(
            "Found **{}** violation{}.\n\n",
            total,
            if total == 1 { "" } else { "s" }
        ));

        output.push_str("| Severity | Count |\n|---|---:|\n");
        for severity in Severity::ALL {
            output.push_str(&format!(
                "| {} | {} |\n",
                severity_label(severity),
                results.violation_count(severity)
            ));
        }

        output.push_str("\n### Violations\n\n");
        output.push_str("| # | Severity | Rule | Engine | Location | Message |\n");
        output.push_str("|---:|---|---|---|---|---|\n");
        let violations = results.violations_sorted_by_severity();
        for (i, violation) in violations.iter().take(self.max_violation_rows).enumerate() {
            output.push_str(&format_row(i + 1, violation));
        }

        let omitted = violations.len().saturating_sub(self.max_violation_rows);
        if omitted > 0 {
            output.push_str(&format!(
                "\n_{} more violation{} not shown; see the uploaded results artifact._\n",
                omitted,
                if omitted == 1 { " is" } else { "s are" }
            ));
        }

        output
    }
}

/// Write results to `path` as markdown (`.md`) or structured JSON (`.json`)
pub fn write_output(
    path: &str,
    results: &Results,
    summarizer: &dyn Summarizer,
) -> anyhow::Result<()> {
    let content = if path.ends_with(".json") {
        serde_json::to_string_pretty(results)?
    } else if path.ends_with(".md") {
        summarizer.create_summary_markdown(results)
    } else {
        bail!("Output file must end with .md or .json");
    };

    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path))?;
    info!("Results written to {}", path);
    Ok(())
}

fn severity_label(severity: Severity) -> String {
    format!("{} ({})", severity, severity.label())
}

fn format_row(number: usize, violation: &Violation) -> String {
    let rule = escape_cell(&violation.rule);
    let rule = match &violation.url {
        Some(url) => format!("[{}]({})", rule, escape_link_target(url)),
        None => rule,
    };
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        number,
        severity_label(violation.severity),
        rule,
        escape_cell(&violation.engine),
        escape_cell(&violation.location.to_string()),
        escape_cell(&violation.message)
    )
}

/// Keep cell text on one line and out of the table syntax
fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Percent-encode characters that would end the link target or the table cell
fn escape_link_target(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '(' => escaped.push_str("%28"),
            ')' => escaped.push_str("%29"),
            '|' => escaped.push_str("%7C"),
            ' ' => escaped.push_str("%20"),
            '\n' | '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ViolationLocation;

    fn violation(severity: i64, file: &str, line: u32, rule: &str) -> Violation {
        Violation {
            severity: Severity::new(severity).unwrap(),
            location: ViolationLocation::new(file, line, 1),
            rule: rule.into(),
            engine: "pmd".into(),
            category: "Security".into(),
            message: format!("{} message", rule),
            url: None,
        }
    }

    #[test]
    fn test_no_violations_document() {
        let markdown = MarkdownSummarizer::new(10).create_summary_markdown(&Results::default());
        assert!(markdown.starts_with(SUMMARY_TITLE));
        assert!(markdown.contains("No violations found."));
        assert!(!markdown.contains("| Severity |"));
    }

    #[test]
    fn test_counts_and_order() {
        let results = Results::new(vec![
            violation(3, "B.cls", 5, "ruleC"),
            violation(1, "A.cls", 9, "ruleA"),
            violation(3, "A.cls", 1, "ruleB"),
        ]);
        let markdown = MarkdownSummarizer::new(10).create_summary_markdown(&results);

        assert!(markdown.contains("Found **3** violations."));
        assert!(markdown.contains("| 1 (Critical) | 1 |"));
        assert!(markdown.contains("| 3 (Moderate) | 2 |"));
        assert!(markdown.contains("| 5 (Info) | 0 |"));

        let a = markdown.find("| 1 | 1 (Critical) | ruleA |").unwrap();
        let b = markdown.find("| 2 | 3 (Moderate) | ruleB |").unwrap();
        let c = markdown.find("| 3 | 3 (Moderate) | ruleC |").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_does_not_mutate_results() {
        let results = Results::new(vec![violation(2, "A.cls", 1, "r")]);
        let before = results.clone();
        MarkdownSummarizer::new(10).create_summary_markdown(&results);
        assert_eq!(results, before);
    }

    #[test]
    fn test_row_cap_reports_omitted() {
        let results = Results::new(
            (0..5)
                .map(|i| violation(2, "A.cls", i, &format!("rule{}", i)))
                .collect(),
        );
        let markdown = MarkdownSummarizer::new(3).create_summary_markdown(&results);
        assert!(markdown.contains("| 3 | 2 (High) | rule2 |"));
        assert!(!markdown.contains("rule3 |"));
        assert!(markdown.contains("_2 more violations are not shown"));
        assert!(markdown.contains("Found **5** violations."));
    }

    #[test]
    fn test_write_output_formats() {
        let dir = tempfile::tempdir().unwrap();
        let results = Results::new(vec![violation(4, "A.cls", 2, "ruleA")]);
        let summarizer = MarkdownSummarizer::new(10);

        let md = dir.path().join("summary.md");
        write_output(md.to_str().unwrap(), &results, &summarizer).unwrap();
        assert!(std::fs::read_to_string(&md).unwrap().contains("| 4 (Low) | 1 |"));

        let json = dir.path().join("summary.json");
        write_output(json.to_str().unwrap(), &results, &summarizer).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["total_violations"], 1);
        assert_eq!(value["violation_counts"][3], 1);
        assert_eq!(value["violations"][0]["severity"], 4);
        assert_eq!(value["violations"][0]["location"]["file"], "A.cls");

        let txt = dir.path().join("summary.txt");
        assert!(write_output(txt.to_str().unwrap(), &results, &summarizer).is_err());
    }

    #[test]
    fn test_cells_are_escaped_and_rules_linked() {
        let mut v = violation(1, "A.cls", 1, "ApexCRUDViolation");
        v.message = "a | b\nc".into();
        v.url = Some("https://pmd.github.io/crud".into());
        let markdown = MarkdownSummarizer::new(10).create_summary_markdown(&Results::new(vec![v]));
        assert!(markdown.contains("[ApexCRUDViolation](https://pmd.github.io/crud)"));
        assert!(markdown.contains("a \\| b c"));
        assert!(markdown.contains("Found **1** violation."));
    }

    #[test]
    fn test_rule_link_target_cannot_break_row() {
        let mut v = violation(2, "A.cls", 3, "ApexDoc");
        v.url = Some("https://example.com/rules(apex)|doc page".into());
        let markdown = MarkdownSummarizer::new(10).create_summary_markdown(&Results::new(vec![v]));
        let row = markdown
            .lines()
            .find(|l| l.starts_with("| 1 |"))
            .unwrap();
        assert!(row.contains("[ApexDoc](https://example.com/rules%28apex%29%7Cdoc%20page)"));
        assert_eq!(row.matches(" | ").count(), 5);
    }
}
