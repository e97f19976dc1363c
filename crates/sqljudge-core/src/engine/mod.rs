//! Judging engine: drives the comparison of a submission against the
//! solution over every seed database and reports the outcome.

mod exercise;
mod non_select;
mod runner;
mod select;

pub use runner::judge;

use crate::config::JudgeConfig;
use crate::database::{CursorMode, SeedDatabase};
use crate::errors::{JudgeFailure, RecoverAt};
use crate::model::{ErrorKind, Message, MessageFormat, Status};
use crate::result_set::ResultSet;
use crate::statement::{PolicyRules, Statement};
use crate::translator::{Text, Translator};

/// Read-only state shared by every judging step of one run.
pub(crate) struct JudgeEnv<'a> {
    pub config: &'a JudgeConfig,
    pub translator: Translator,
}

impl<'a> JudgeEnv<'a> {
    pub fn new(config: &'a JudgeConfig) -> Self {
        Self {
            config,
            translator: config.translator(),
        }
    }

    pub fn status(&self, kind: ErrorKind) -> Status {
        self.translator.status(kind)
    }

    pub fn text(&self, text: &Text) -> String {
        self.translator.translate(text)
    }

    pub fn failure(&self, kind: ErrorKind) -> JudgeFailure {
        JudgeFailure::new(self.status(kind))
    }

    pub fn verdict_status(&self, passed: bool) -> Status {
        self.status(if passed {
            ErrorKind::Correct
        } else {
            ErrorKind::Wrong
        })
    }
}

/// Runs the solution, then the submission, each on its own copy.
///
/// A broken solution is the exercise author's problem and aborts the run; a
/// broken submission only fails the current context.
pub(crate) fn execute_both(
    env: &JudgeEnv<'_>,
    db: &mut SeedDatabase,
    solution: &Statement,
    submission: &Statement,
) -> Result<(ResultSet, ResultSet), JudgeFailure> {
    let expected = execute_solution(env, db, solution)?;

    let generated = db
        .execute(CursorMode::Submission, submission, env.config.max_rows)
        .map_err(|e| {
            tracing::debug!(event = "judge.submission.failed", seed = %db.name(), error = %e);
            env.failure(ErrorKind::CompilationError)
                .with_message(Message::new(MessageFormat::Code, format!("Error:\n    {e}")).for_student())
                .recover_at(RecoverAt::Context)
        })?;

    Ok((expected, generated))
}

/// Runs the solution alone on its copy. A failure here is always fatal.
pub(crate) fn execute_solution(
    env: &JudgeEnv<'_>,
    db: &mut SeedDatabase,
    solution: &Statement,
) -> Result<ResultSet, JudgeFailure> {
    db.execute(CursorMode::Solution, solution, env.config.max_rows)
        .map_err(|e| {
            tracing::warn!(event = "judge.solution.failed", seed = %db.name(), error = %e);
            env.failure(ErrorKind::InternalError)
                .with_staff_detail(format!("Solution is not working:\n    {e}"))
        })
}

/// Applies one rule set to a statement.
///
/// An unusable pattern is an authoring error and aborts the run.
pub(crate) fn enforce_policy(
    env: &JudgeEnv<'_>,
    statement: &Statement,
    rules: &PolicyRules,
    kind: ErrorKind,
    recover_at: RecoverAt,
) -> Result<(), JudgeFailure> {
    let violation = statement.match_policy(rules).map_err(|e| {
        env.failure(ErrorKind::InternalError)
            .with_staff_detail(format!("Invalid policy regex:\n    {e}"))
    })?;

    match violation {
        None => Ok(()),
        Some(violation) => {
            tracing::debug!(event = "judge.policy.violation", rule = ?violation.rule, value = %violation.value);
            Err(env
                .failure(kind)
                .with_message(
                    Message::new(MessageFormat::CalloutDanger, env.text(&violation.text()))
                        .for_student(),
                )
                .recover_at(recover_at))
        }
    }
}
