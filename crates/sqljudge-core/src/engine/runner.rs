use super::exercise::Exercise;
use super::non_select::compare_non_select;
use super::select::compare_select;
use super::{enforce_policy, execute_solution, JudgeEnv};
use crate::config::JudgeConfig;
use crate::database::SeedDatabase;
use crate::errors::{JudgeFailure, RecoverAt};
use crate::model::{AnnotationSeverity, Check, ErrorKind, Message, MessageFormat, Status, Verdict};
use crate::report::{FeedbackSink, Reporter, ScopeKind};
use crate::statement::Statement;
use crate::translator::Text;

#[derive(Debug, Default)]
struct Tally {
    contexts: usize,
    failed_contexts: usize,
    failed_tabs: usize,
    /// Status of the first failure absorbed below the judgement.
    first_failure: Option<Status>,
}

impl Tally {
    fn absorb(&mut self, failure: &JudgeFailure) {
        if self.first_failure.is_none() {
            self.first_failure = Some(failure.status.clone());
        }
    }
}

/// Judges the submission named in `config` and streams feedback to `sink`.
///
/// Every failure ends up in the stream; the returned verdict mirrors the
/// closing judgement command.
pub fn judge(config: &JudgeConfig, sink: &mut dyn FeedbackSink) -> Verdict {
    let env = JudgeEnv::new(config);
    let mut reporter = Reporter::new(sink);
    let mut tally = Tally::default();

    tracing::info!(
        event = "judge.run.start",
        source = %config.source.display(),
        language = %config.natural_language
    );

    reporter.start_judgement();
    let (accepted, status) = match run(&env, &mut reporter, &mut tally) {
        Ok(()) => {
            let accepted = tally.failed_contexts == 0 && tally.failed_tabs == 0;
            let status = match tally.first_failure.take() {
                Some(status) if !accepted => status,
                _ => env.verdict_status(accepted),
            };
            reporter.close_judgement(accepted, status.clone());
            (accepted, status)
        }
        Err(mut failure) => {
            tracing::info!(event = "judge.run.aborted", status = ?failure.status.kind);
            let status = failure.status.clone();
            reporter.unwind(ScopeKind::Judgement, &mut failure);
            (false, status)
        }
    };

    tracing::info!(
        event = "judge.run.done",
        accepted,
        contexts = tally.contexts,
        failed_contexts = tally.failed_contexts
    );

    Verdict {
        accepted,
        status,
        contexts: tally.contexts,
        failed_contexts: tally.failed_contexts,
    }
}

fn run(env: &JudgeEnv<'_>, reporter: &mut Reporter<'_>, tally: &mut Tally) -> Result<(), JudgeFailure> {
    let mut exercise = Exercise::resolve(env)?;
    let expected = exercise.solution.len();
    let submitted = exercise.submission.len();

    if submitted > expected {
        return Err(env.failure(ErrorKind::RuntimeError).with_message(
            Message::new(
                MessageFormat::CalloutDanger,
                env.text(&Text::SubmissionContainsMoreQueries {
                    submitted,
                    expected,
                }),
            )
            .for_student(),
        ));
    }

    if env.config.semicolon_warning
        && exercise
            .submission
            .last()
            .map_or(true, |s| !s.has_ending_semicolon())
    {
        let row = exercise.submission_raw.trim_end().matches('\n').count();
        reporter.annotate(row, env.text(&Text::AddASemicolon), AnnotationSeverity::Warning);
    }

    for (index, solution) in exercise.solution.iter().enumerate() {
        reporter.start_tab(format!("Query {}", index + 1));

        let outcome = match exercise.submission.get(index) {
            Some(submission) => {
                judge_tab(env, reporter, tally, &mut exercise.seeds, solution, submission)
            }
            None => Err(env.failure(ErrorKind::RuntimeError).with_message(
                Message::new(
                    MessageFormat::CalloutDanger,
                    env.text(&Text::SubmissionContainsLessQueries {
                        submitted,
                        expected,
                    }),
                )
                .for_student(),
            )),
        };

        match outcome {
            Ok(()) => reporter.close_tab(),
            Err(mut failure) => {
                tally.failed_tabs += 1;
                reporter.unwind(ScopeKind::Tab, &mut failure);
                if failure.recover_at != RecoverAt::Tab {
                    return Err(failure);
                }
                tally.absorb(&failure);
            }
        }
    }

    Ok(())
}

fn judge_tab(
    env: &JudgeEnv<'_>,
    reporter: &mut Reporter<'_>,
    tally: &mut Tally,
    seeds: &mut [SeedDatabase],
    solution: &Statement,
    submission: &Statement,
) -> Result<(), JudgeFailure> {
    if let Err(rejected) = admit(env, solution, submission) {
        // later solution statements build on this one
        for db in seeds.iter_mut() {
            execute_solution(env, db, solution)?;
        }
        return Err(rejected);
    }

    for db in seeds.iter_mut() {
        judge_context(env, reporter, tally, db, solution, submission)?;
    }

    Ok(())
}

/// Checks that hold before the submission may run at all.
fn admit(env: &JudgeEnv<'_>, solution: &Statement, submission: &Statement) -> Result<(), JudgeFailure> {
    if submission.statement_type() != solution.statement_type() {
        return Err(env
            .failure(ErrorKind::RuntimeError)
            .with_message(
                Message::new(
                    MessageFormat::CalloutDanger,
                    env.text(&Text::SubmissionWrongQueryType {
                        submitted: submission.statement_type().to_string(),
                    }),
                )
                .for_student(),
            )
            .recover_at(RecoverAt::Tab));
    }

    enforce_policy(
        env,
        submission,
        &env.config.pre_execution_rules(),
        ErrorKind::CompilationError,
        RecoverAt::Tab,
    )
}

/// One (statement, seed database) pair. Failures scoped to the context are
/// absorbed here; anything wider is handed to the caller.
fn judge_context(
    env: &JudgeEnv<'_>,
    reporter: &mut Reporter<'_>,
    tally: &mut Tally,
    db: &mut SeedDatabase,
    solution: &Statement,
    submission: &Statement,
) -> Result<(), JudgeFailure> {
    reporter.start_context();
    reporter.start_testcase(Message::new(
        MessageFormat::Sql,
        format!("-- sqlite3 {}\n{}", db.name(), submission.normalized_text()),
    ));

    let mut checks: Vec<Check> = Vec::new();
    let outcome = if solution.is_select() {
        compare_select(env, db, solution, submission, &mut checks)
    } else {
        compare_non_select(env, db, solution, submission, &mut checks)
    };

    for check in &checks {
        reporter.check(check);
    }

    tally.contexts += 1;
    match outcome {
        Ok(()) => {
            let accepted = checks.iter().all(Check::passed);
            if !accepted {
                tally.failed_contexts += 1;
            }
            tracing::debug!(event = "judge.context.done", seed = %db.name(), accepted);
            reporter.close_testcase(accepted);
            reporter.close_context(accepted);
            Ok(())
        }
        Err(mut failure) => {
            tally.failed_contexts += 1;
            tracing::debug!(
                event = "judge.context.failed",
                seed = %db.name(),
                status = ?failure.status.kind,
                recover_at = ?failure.recover_at
            );
            reporter.unwind(ScopeKind::TestCase, &mut failure);
            reporter.unwind(ScopeKind::Context, &mut failure);
            if failure.recover_at == RecoverAt::Context {
                tally.absorb(&failure);
                Ok(())
            } else {
                Err(failure)
            }
        }
    }
}
