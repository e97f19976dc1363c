use super::{CursorMode, DatabaseError, SeedDatabase};
use crate::result_set::ResultSet;
use rusqlite::{params, Connection};

/// Table names of both copies, partitioned by how they compare.
///
/// Every name lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDiff {
    /// Names containing a single quote; never referenced in generated SQL.
    pub incorrect_name: Vec<String>,
    pub diff_layout: Vec<String>,
    pub diff_content: Vec<String>,
    pub correct: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnInfo {
    name: String,
    declared_type: String,
    not_null: bool,
    default: Option<String>,
    pk: i64,
    generated: bool,
}

impl ColumnInfo {
    fn same_as(&self, other: &ColumnInfo) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.declared_type == other.declared_type
            && self.not_null == other.not_null
            && self.default == other.default
            && self.pk == other.pk
            && self.generated == other.generated
    }
}

impl SeedDatabase {
    /// `PRAGMA table_info` of `table` in both copies: (solution, submission).
    pub fn get_table_layout(
        &mut self,
        max_rows: usize,
        table: &str,
    ) -> Result<(ResultSet, ResultSet), DatabaseError> {
        let solution = self.query(
            CursorMode::Joined,
            &format!("PRAGMA solution.table_info('{table}')"),
            max_rows,
        )?;
        let submission = self.query(
            CursorMode::Joined,
            &format!("PRAGMA submission.table_info('{table}')"),
            max_rows,
        )?;
        Ok((solution, submission))
    }

    /// Full content of `table` in both copies: (solution, submission).
    pub fn get_table_content(
        &mut self,
        max_rows: usize,
        table: &str,
    ) -> Result<(ResultSet, ResultSet), DatabaseError> {
        let solution = self.query(
            CursorMode::Joined,
            &format!("SELECT * FROM solution.'{table}'"),
            max_rows,
        )?;
        let submission = self.query(
            CursorMode::Joined,
            &format!("SELECT * FROM submission.'{table}'"),
            max_rows,
        )?;
        Ok((solution, submission))
    }

    /// Compares both copies table by table.
    ///
    /// Names are checked first, then layout, and content only for tables
    /// whose layouts agree.
    pub fn diff(&mut self) -> Result<TableDiff, DatabaseError> {
        let conn = self.connect(CursorMode::Joined)?;

        let solution_tables = table_names(conn, "solution")?;
        let submission_tables = table_names(conn, "submission")?;

        let mut tables = solution_tables;
        for name in submission_tables {
            if !tables.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                tables.push(name);
            }
        }

        let mut diff = TableDiff::default();
        for table in tables {
            if table.contains('\'') {
                diff.incorrect_name.push(table);
                continue;
            }

            let solution = table_info(conn, "solution", &table)?;
            let submission = table_info(conn, "submission", &table)?;
            let same_layout = !solution.is_empty()
                && solution.len() == submission.len()
                && solution.iter().zip(&submission).all(|(a, b)| a.same_as(b));
            if !same_layout {
                diff.diff_layout.push(table);
                continue;
            }

            if count_different_rows(conn, &table, &solution)? == 0 {
                diff.correct.push(table);
            } else {
                diff.diff_content.push(table);
            }
        }

        tracing::debug!(
            event = "judge.db.diff",
            seed = %self.name,
            incorrect_name = diff.incorrect_name.len(),
            diff_layout = diff.diff_layout.len(),
            diff_content = diff.diff_content.len(),
            correct = diff.correct.len()
        );
        Ok(diff)
    }
}

fn table_names(conn: &Connection, schema: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {schema}.sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
    ))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn table_info(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk, hidden \
         FROM pragma_table_xinfo(?1, ?2) WHERE hidden <> 1 ORDER BY cid",
    )?;
    let columns = stmt
        .query_map(params![table, schema], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                declared_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default: row.get(3)?,
                pk: row.get(4)?,
                generated: row.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Rows of the grouped multiset present on one side only, both directions.
///
/// Columns are named explicitly so generated columns take part in grouping.
fn count_different_rows(
    conn: &Connection,
    table: &str,
    columns: &[ColumnInfo],
) -> rusqlite::Result<i64> {
    let select = columns
        .iter()
        .map(|c| format!("\"{}\"", c.name.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ");
    let group_by = (1..=columns.len())
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let sol = format!("SELECT {select}, count(*) FROM solution.'{table}' GROUP BY {group_by}");
    let sub = format!("SELECT {select}, count(*) FROM submission.'{table}' GROUP BY {group_by}");
    let sql = format!(
        "SELECT (SELECT count(1) FROM ({sol} EXCEPT {sub})) + (SELECT count(1) FROM ({sub} EXCEPT {sol}))"
    );
    conn.query_row(&sql, [], |row| row.get(0))
}
