use serde::Serialize;

use crate::check::CheckOutcome;

pub const FOUND_PREFIX: &str = "High/Critical Issues found for targets";
pub const NOT_FOUND_PREFIX: &str = "No high/Critical Issues found for targets";
pub const NO_MATCHING_TARGETS: &str = "No matching targets found.";
pub const NO_ISSUES_FALLBACK: &str = "No high/critical issues found for provided targets";

/// Issue titles collected for one resolved target, in issue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetIssues {
    pub target: String,
    pub issues: Vec<String>,
}

/// Per-target accumulator for a completed check.
///
/// Every resolved target has an entry, so a target without findings is
/// distinguishable from one that was never resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    targets: Vec<TargetIssues>,
}

impl Summary {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            targets: names
                .into_iter()
                .map(|name| TargetIssues {
                    target: name.to_string(),
                    issues: vec![],
                })
                .collect(),
        }
    }

    /// Append `title` under `target`. Unknown targets are ignored.
    pub fn record(&mut self, target: &str, title: &str) {
        if let Some(entry) = self.targets.iter_mut().find(|t| t.target == target) {
            entry.issues.push(title.to_string());
        }
    }

    pub fn targets(&self) -> &[TargetIssues] {
        &self.targets
    }

    pub fn issues_for(&self, target: &str) -> Option<&[String]> {
        self.targets
            .iter()
            .find(|t| t.target == target)
            .map(|t| t.issues.as_slice())
    }

    pub fn found(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| !t.issues.is_empty())
            .map(|t| t.target.as_str())
            .collect()
    }

    pub fn not_found(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.issues.is_empty())
            .map(|t| t.target.as_str())
            .collect()
    }

    pub fn message(&self) -> String {
        render_message(&self.found(), &self.not_found())
    }
}

/// Two-line summary, one line per non-empty bucket.
pub fn render_message(found: &[&str], not_found: &[&str]) -> String {
    let mut lines = Vec::with_capacity(2);
    if !found.is_empty() {
        lines.push(format!("{FOUND_PREFIX}: {}", json_list(found)));
    }
    if !not_found.is_empty() {
        lines.push(format!("{NOT_FOUND_PREFIX}: {}", json_list(not_found)));
    }
    if lines.is_empty() {
        return NO_ISSUES_FALLBACK.to_string();
    }
    lines.join("\n")
}

fn json_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|n| serde_json::Value::from(*n).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

pub trait OutputFormatter {
    fn write_outcome(
        &self,
        outcome: &CheckOutcome,
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()>;
}

pub struct TextOutput {
    pub show_issues: bool,
}

impl OutputFormatter for TextOutput {
    fn write_outcome(
        &self,
        outcome: &CheckOutcome,
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", outcome.message())?;

        if let (true, CheckOutcome::Checked(summary)) = (self.show_issues, outcome) {
            for entry in summary.targets().iter().filter(|t| !t.issues.is_empty()) {
                writeln!(writer, "{}:", entry.target)?;
                for title in &entry.issues {
                    writeln!(writer, "  {title}")?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: &'static str,
    message: String,
    found: Vec<&'a str>,
    not_found: Vec<&'a str>,
    targets: &'a [TargetIssues],
}

pub struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn write_outcome(
        &self,
        outcome: &CheckOutcome,
        writer: &mut dyn std::io::Write,
    ) -> std::io::Result<()> {
        let report = match outcome {
            CheckOutcome::NoMatchingTargets => JsonReport {
                status: "no_matching_targets",
                message: outcome.message(),
                found: vec![],
                not_found: vec![],
                targets: &[],
            },
            CheckOutcome::Checked(summary) => JsonReport {
                status: "checked",
                message: outcome.message(),
                found: summary.found(),
                not_found: summary.not_found(),
                targets: summary.targets(),
            },
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        Ok(())
    }
}

pub fn formatter(json: bool, show_issues: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput)
    } else {
        Box::new(TextOutput { show_issues })
    }
}
