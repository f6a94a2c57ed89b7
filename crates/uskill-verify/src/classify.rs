use serde::{Deserialize, Serialize};
use serde_json::Value;
use uskill_client::{truncate_chars, value_text, InvokeError, RawSkillResponse};

const MESSAGE_MAX_CHARS: usize = 80;
const FAILED_BODY_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
/// Enumerates supported `Verdict` values.
pub enum Verdict {
    Pass,
    Warn,
    Fail,
    Timeout,
    Error,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
        }
    }

    /// FAIL, ERROR, and TIMEOUT all land in the failed bucket of a summary.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Timeout | Self::Error)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Result of invoking one skill during a verification run.
pub struct SkillOutcome {
    pub skill: String,
    pub verdict: Verdict,
    pub message: String,
}

impl SkillOutcome {
    pub fn new(skill: impl Into<String>, verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            verdict,
            message: message.into(),
        }
    }
}

/// Maps a raw invocation result to a verdict and a bounded message.
pub fn classify(skill: &str, result: Result<RawSkillResponse, InvokeError>) -> SkillOutcome {
    let response = match result {
        Ok(response) => response,
        Err(InvokeError::Timeout { .. }) => {
            return SkillOutcome::new(skill, Verdict::Timeout, "Request timeout");
        }
        Err(InvokeError::Transport(detail)) => {
            return SkillOutcome::new(
                skill,
                Verdict::Error,
                truncate_chars(&detail, MESSAGE_MAX_CHARS),
            );
        }
    };

    if !response.is_success() {
        let body = truncate_chars(&value_text(&response.body), FAILED_BODY_MAX_CHARS);
        return SkillOutcome::new(
            skill,
            Verdict::Fail,
            format!("HTTP {}: {body}", response.status),
        );
    }

    let Value::Object(body) = &response.body else {
        return SkillOutcome::new(skill, Verdict::Pass, "OK");
    };
    if let Some(error) = body.get("error") {
        return SkillOutcome::new(
            skill,
            Verdict::Warn,
            truncate_chars(&value_text(error), MESSAGE_MAX_CHARS),
        );
    }
    if body.get("success") == Some(&Value::Bool(false)) {
        let detail = body
            .get("message")
            .or_else(|| body.get("error"))
            .map(value_text)
            .unwrap_or_default();
        return SkillOutcome::new(
            skill,
            Verdict::Warn,
            truncate_chars(&detail, MESSAGE_MAX_CHARS),
        );
    }
    SkillOutcome::new(skill, Verdict::Pass, "OK")
}
