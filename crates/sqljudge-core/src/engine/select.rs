use super::{enforce_policy, execute_both, JudgeEnv};
use crate::database::SeedDatabase;
use crate::errors::{JudgeFailure, RecoverAt};
use crate::model::{Check, ErrorKind, Message, MessageFormat};
use crate::result_set::{shared_columns, ResultSet};
use crate::statement::Statement;
use crate::translator::Text;

/// Compares the rows a SELECT returns.
pub(crate) fn compare_select(
    env: &JudgeEnv<'_>,
    db: &mut SeedDatabase,
    solution: &Statement,
    submission: &Statement,
    checks: &mut Vec<Check>,
) -> Result<(), JudgeFailure> {
    let (mut expected, mut generated) = execute_both(env, db, solution, submission)?;

    if env.config.allow_different_column_order {
        expected.index_columns(generated.columns());
    }

    let shared = shared_columns(&expected, &generated);
    if !solution.is_ordered() {
        expected.sort_rows(&shared);
        generated.sort_rows(&shared);
    }

    checks.push(csv_check(env, solution, &expected, &generated, &shared));
    checks.push(types_check(env, &expected, &generated));

    if env.config.strict_identical_order_by
        && checks.iter().all(Check::passed)
        && solution.is_ordered() != submission.is_ordered()
    {
        checks.push(ordering_check(env, solution, submission));
        return Err(env.failure(ErrorKind::Wrong).recover_at(RecoverAt::Context));
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

fn csv_check(
    env: &JudgeEnv<'_>,
    solution: &Statement,
    expected: &ResultSet,
    generated: &ResultSet,
    shared: &[String],
) -> Check {
    let expected_csv = expected.csv_out();
    let generated_csv = generated.csv_out();
    let passed = expected_csv == generated_csv;

    let mut notes = Vec::new();
    if expected.column_count() != generated.column_count() {
        notes.push(Message::new(
            MessageFormat::CalloutDanger,
            env.text(&Text::DifferentColumnCount {
                expected: expected.column_count(),
                submitted: generated.column_count(),
            }),
        ));
    }
    if expected.row_count() != generated.row_count() {
        notes.push(Message::new(
            MessageFormat::CalloutDanger,
            env.text(&Text::DifferentRowCount {
                expected: expected.row_count(),
                submitted: generated.row_count(),
            }),
        ));
    }
    if !passed && solution.is_ordered() && same_rows_in_any_order(expected, generated, shared) {
        notes.push(Message::new(
            MessageFormat::CalloutInfo,
            env.text(&Text::CorrectRowsWrongOrder),
        ));
    }

    Check {
        description: Message::new(MessageFormat::Text, env.text(&Text::ComparingQueryOutputCsvContent)),
        expected: expected_csv,
        generated: generated_csv,
        format: Some(MessageFormat::Csv),
        status: env.verdict_status(passed),
        notes,
    }
}

fn same_rows_in_any_order(expected: &ResultSet, generated: &ResultSet, shared: &[String]) -> bool {
    let mut expected = expected.clone();
    let mut generated = generated.clone();
    expected.sort_rows(shared);
    generated.sort_rows(shared);
    expected.csv_out() == generated.csv_out()
}

fn types_check(env: &JudgeEnv<'_>, expected: &ResultSet, generated: &ResultSet) -> Check {
    let expected_types = expected.types_out();
    let generated_types = generated.types_out();
    let passed = expected_types == generated_types;

    Check {
        description: Message::new(MessageFormat::Text, env.text(&Text::ComparingQueryOutputTypes)),
        expected: expected_types,
        generated: generated_types,
        format: None,
        status: env.verdict_status(passed),
        notes: Vec::new(),
    }
}

fn ordering_check(env: &JudgeEnv<'_>, solution: &Statement, submission: &Statement) -> Check {
    let describe = |ordered: bool| {
        env.text(if ordered {
            &Text::RowsAreBeingOrdered
        } else {
            &Text::RowsAreNotBeingOrdered
        })
    };
    let description = if solution.is_ordered() {
        Text::QueryShouldOrderRows
    } else {
        Text::QueryShouldNotOrderRows
    };
    let passed = solution.is_ordered() == submission.is_ordered();

    Check {
        description: Message::new(MessageFormat::Text, env.text(&description)),
        expected: describe(solution.is_ordered()),
        generated: describe(submission.is_ordered()),
        format: None,
        status: env.verdict_status(passed),
        notes: Vec::new(),
    }
}
