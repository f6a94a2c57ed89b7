use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uskill_client::{truncate_chars, CatalogEntry, SkillInvoker, CALL_TIMEOUT_MS};

use crate::classify::{classify, SkillOutcome, Verdict};
use crate::synthesize::synthesize;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;
const MESSAGE_MAX_CHARS: usize = 80;

/// Runtime settings for a verification dispatch.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub max_in_flight: usize,
    pub invoke_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            invoke_timeout: Duration::from_millis(CALL_TIMEOUT_MS),
        }
    }
}

/// One completed invocation, reported in completion order.
#[derive(Debug, Clone, Copy)]
pub struct DispatchProgress<'a> {
    pub completed: usize,
    pub total: usize,
    pub outcome: &'a SkillOutcome,
}

pub type ProgressHandler = Arc<dyn Fn(DispatchProgress<'_>) + Send + Sync>;

/// Invokes every skill exactly once with synthesized parameters.
///
/// At most `max_in_flight` invocations run at a time. Outcomes come back in
/// completion order; a failing or panicking invocation only affects its own
/// outcome. Malformed catalog entries are never invoked and report `ERROR`.
pub async fn dispatch_skills(
    invoker: Arc<dyn SkillInvoker>,
    skills: Vec<CatalogEntry>,
    config: &DispatchConfig,
    on_progress: Option<ProgressHandler>,
) -> Vec<SkillOutcome> {
    let total = skills.len();
    let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_skills = HashMap::with_capacity(total);

    for entry in skills {
        let invoker = Arc::clone(&invoker);
        let permits = Arc::clone(&permits);
        let timeout = config.invoke_timeout;
        let name = entry.name().to_string();
        let handle = tasks.spawn(async move {
            let skill = match entry {
                CatalogEntry::Skill(skill) => skill,
                CatalogEntry::Malformed { name, reason } => {
                    return SkillOutcome::new(
                        name,
                        Verdict::Error,
                        truncate_chars(
                            &format!("invalid skill descriptor: {reason}"),
                            MESSAGE_MAX_CHARS,
                        ),
                    );
                }
            };
            let Ok(_permit) = permits.acquire_owned().await else {
                return SkillOutcome::new(
                    skill.name,
                    Verdict::Error,
                    "dispatcher closed before invocation",
                );
            };
            let params = synthesize(&skill);
            let result = invoker.invoke(&skill.name, &params, timeout).await;
            classify(&skill.name, result)
        });
        task_skills.insert(handle.id(), name);
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((id, outcome)) => {
                task_skills.remove(&id);
                outcome
            }
            Err(error) => {
                let skill = task_skills.remove(&error.id()).unwrap_or_default();
                tracing::warn!(skill = %skill, error = %error, "skill invocation task failed");
                SkillOutcome::new(
                    skill,
                    Verdict::Error,
                    truncate_chars(
                        &format!("invocation task failed: {error}"),
                        MESSAGE_MAX_CHARS,
                    ),
                )
            }
        };
        tracing::debug!(
            skill = %outcome.skill,
            verdict = outcome.verdict.as_str(),
            "skill verified"
        );
        if let Some(handler) = on_progress.as_ref() {
            handler(DispatchProgress {
                completed: outcomes.len() + 1,
                total,
                outcome: &outcome,
            });
        }
        outcomes.push(outcome);
    }
    outcomes
}
