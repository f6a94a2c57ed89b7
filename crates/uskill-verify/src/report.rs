use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::classify::{SkillOutcome, Verdict};
use crate::persist::persist_report;

const REPORT_TITLE: &str = "# Unity Skills Test Report";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Verdict counts for a run; `failed` includes ERROR and TIMEOUT.
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Output format shared by the displayed and the persisted report.
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Final, name-ordered result of one verification run.
pub struct VerificationReport {
    pub generated_unix_ms: u64,
    pub summary: ReportSummary,
    pub outcomes: Vec<SkillOutcome>,
}

impl VerificationReport {
    pub fn from_outcomes(mut outcomes: Vec<SkillOutcome>) -> Self {
        outcomes.sort_by(|left, right| left.skill.cmp(&right.skill));
        let summary = summarize(&outcomes);
        Self {
            generated_unix_ms: unix_now_ms(),
            summary,
            outcomes,
        }
    }

    /// Renders the report once; callers print and persist the same string.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Markdown => Ok(self.render_markdown()),
            ReportFormat::Json => {
                let mut rendered = serde_json::to_string_pretty(self)?;
                rendered.push('\n');
                Ok(rendered)
            }
        }
    }

    /// Renders the summary header and the result table.
    pub fn render_markdown(&self) -> String {
        let mut lines = vec![
            REPORT_TITLE.to_string(),
            String::new(),
            format!("- Total: {} skills", self.summary.total),
            format!("- Passed: {}", self.summary.passed),
            format!("- Warned: {}", self.summary.warned),
            format!("- Failed: {}", self.summary.failed),
            String::new(),
            "| # | Skill Name | Status | Message |".to_string(),
            "|---|------------|--------|---------|".to_string(),
        ];
        for (index, outcome) in self.outcomes.iter().enumerate() {
            lines.push(format!(
                "| {} | `{}` | {} | {} |",
                index + 1,
                outcome.skill,
                outcome.verdict,
                escape_table_cell(&outcome.message)
            ));
        }
        let mut rendered = lines.join("\n");
        rendered.push('\n');
        rendered
    }

    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<String> {
        let rendered = self.render(format)?;
        persist_report(path, &rendered)?;
        Ok(rendered)
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn summarize(outcomes: &[SkillOutcome]) -> ReportSummary {
    let count = |wanted: fn(Verdict) -> bool| {
        outcomes
            .iter()
            .filter(|outcome| wanted(outcome.verdict))
            .count()
    };
    ReportSummary {
        total: outcomes.len(),
        passed: count(|verdict| verdict == Verdict::Pass),
        warned: count(|verdict| verdict == Verdict::Warn),
        failed: count(Verdict::is_failure),
    }
}

/// Escapes pipes and flattens line breaks so a message stays in one cell.
pub fn escape_table_cell(message: &str) -> String {
    message
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
