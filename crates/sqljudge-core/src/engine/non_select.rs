use super::{enforce_policy, execute_both, JudgeEnv};
use crate::database::{DatabaseError, SeedDatabase};
use crate::errors::{JudgeFailure, RecoverAt};
use crate::model::{Check, ErrorKind, Message, MessageFormat};
use crate::result_set::ResultSet;
use crate::statement::Statement;
use crate::translator::Text;

/// Compares the database state left behind by a data or schema change.
pub(crate) fn compare_non_select(
    env: &JudgeEnv<'_>,
    db: &mut SeedDatabase,
    solution: &Statement,
    submission: &Statement,
    checks: &mut Vec<Check>,
) -> Result<(), JudgeFailure> {
    execute_both(env, db, solution, submission)?;

    let max_rows = env.config.max_rows;
    let diff = db.diff().map_err(|e| retrieval_failure(env, e))?;

    if let Some(table) = diff.incorrect_name.first() {
        return Err(env
            .failure(ErrorKind::CompilationError)
            .with_message(
                Message::new(
                    MessageFormat::CalloutDanger,
                    env.text(&Text::InvalidSingleQuoteTableName {
                        table: table.clone(),
                    }),
                )
                .for_student(),
            )
            .recover_at(RecoverAt::Context));
    }

    for table in &diff.diff_layout {
        let (solution_layout, submission_layout) = db
            .get_table_layout(max_rows, table)
            .map_err(|e| retrieval_failure(env, e))?;
        checks.push(table_check(
            env,
            Text::ComparingTableLayout {
                table: table.clone(),
            },
            &solution_layout,
            &submission_layout,
            false,
        ));
    }

    for table in &diff.diff_content {
        let (solution_content, submission_content) = db
            .get_table_content(max_rows, table)
            .map_err(|e| retrieval_failure(env, e))?;
        checks.push(table_check(
            env,
            Text::ComparingTableContent {
                table: table.clone(),
            },
            &solution_content,
            &submission_content,
            false,
        ));
    }

    if diff.diff_layout.is_empty() && diff.diff_content.is_empty() {
        let touched = solution
            .first_match_array(&diff.correct)
            .and_then(|symbol| diff.correct.iter().find(|t| t.eq_ignore_ascii_case(symbol)));

        if let Some(table) = touched {
            let (solution_layout, submission_layout) = db
                .get_table_layout(max_rows, table)
                .map_err(|e| retrieval_failure(env, e))?;
            checks.push(table_check(
                env,
                Text::ComparingTableLayout {
                    table: table.clone(),
                },
                &solution_layout,
                &submission_layout,
                true,
            ));

            let (solution_content, submission_content) = db
                .get_table_content(max_rows, table)
                .map_err(|e| retrieval_failure(env, e))?;
            checks.push(table_check(
                env,
                Text::ComparingTableContent {
                    table: table.clone(),
                },
                &solution_content,
                &submission_content,
                true,
            ));
        }
    }

    if checks.iter().all(Check::passed) {
        enforce_policy(
            env,
            submission,
            &env.config.post_execution_rules(),
            ErrorKind::Wrong,
            RecoverAt::Context,
        )?;
    }

    Ok(())
}

fn table_check(
    env: &JudgeEnv<'_>,
    description: Text,
    solution: &ResultSet,
    submission: &ResultSet,
    passed: bool,
) -> Check {
    Check {
        description: Message::new(MessageFormat::Markdown, env.text(&description)),
        expected: solution.csv_out(),
        generated: submission.csv_out(),
        format: Some(MessageFormat::Csv),
        status: env.verdict_status(passed),
        notes: Vec::new(),
    }
}

fn retrieval_failure(env: &JudgeEnv<'_>, e: DatabaseError) -> JudgeFailure {
    tracing::warn!(event = "judge.diff.failed", error = %e);
    env.failure(ErrorKind::InternalError)
        .with_staff_detail(format!("Could not compare databases:\n    {e}"))
}
