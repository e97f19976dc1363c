use rusqlite::types::Value;
use std::cmp::Ordering;
use std::fmt;

/// Storage class of a returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => SqlType::Null,
            Value::Integer(_) => SqlType::Integer,
            Value::Real(_) => SqlType::Real,
            Value::Text(_) => SqlType::Text,
            Value::Blob(_) => SqlType::Blob,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SqlType::Null => "NULL",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        };
        f.write_str(s)
    }
}

/// Tabular output of one executed statement.
///
/// Column names are kept apart from the rows because a query may return
/// several columns with the same name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    rows: Vec<Vec<Value>>,
    columns: Vec<String>,
    column_types: Vec<SqlType>,
}

impl ResultSet {
    pub fn new(rows: Vec<Vec<Value>>, columns: Vec<String>, column_types: Vec<SqlType>) -> Self {
        debug_assert_eq!(columns.len(), column_types.len());
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            rows,
            columns,
            column_types,
        }
    }

    /// Runs a prepared statement and keeps at most `max_rows` rows.
    ///
    /// Statements without a result (DML, DDL) are executed to completion and
    /// yield an empty set. Column names and types are only recorded when at
    /// least one row came back.
    pub fn from_statement(
        max_rows: usize,
        stmt: &mut rusqlite::Statement<'_>,
    ) -> rusqlite::Result<Self> {
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|n| n.to_uppercase())
            .collect();
        let width = names.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            if rows.len() >= max_rows {
                break;
            }
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, Value>(i)?);
            }
            rows.push(values);
        }

        let (columns, column_types) = match rows.first() {
            Some(first) => (names, first.iter().map(SqlType::of).collect()),
            None => (Vec::new(), Vec::new()),
        };

        Ok(Self {
            rows,
            columns,
            column_types,
        })
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> &[SqlType] {
        &self.column_types
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Stable sort on every column whose name is in `sort_on`, in column order.
    pub fn sort_rows(&mut self, sort_on: &[String]) {
        if self.rows.is_empty() || sort_on.is_empty() {
            return;
        }
        let keys: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| sort_on.contains(c))
            .map(|(i, _)| i)
            .collect();
        if keys.is_empty() {
            return;
        }

        self.rows.sort_by(|a, b| {
            keys.iter()
                .map(|&k| compare_values(&a[k], &b[k]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Moves columns into the order of `reference`.
    ///
    /// Duplicate names are consumed positionally, one per reference entry.
    /// Columns not claimed by the reference keep their relative order and go
    /// last.
    pub fn index_columns(&mut self, reference: &[String]) {
        let mut remaining: Vec<Option<&String>> = self.columns.iter().map(Some).collect();
        let mut order = Vec::with_capacity(self.columns.len());

        for wanted in reference {
            let hit = remaining
                .iter()
                .position(|c| c.is_some_and(|name| name == wanted));
            if let Some(i) = hit {
                remaining[i] = None;
                order.push(i);
            }
        }
        order.extend(
            remaining
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_some())
                .map(|(i, _)| i),
        );

        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        self.column_types = order.iter().map(|&i| self.column_types[i]).collect();
        for row in &mut self.rows {
            *row = order.iter().map(|&i| row[i].clone()).collect();
        }
    }

    /// Header plus rows as CSV; NULL renders as an empty field.
    pub fn csv_out(&self) -> String {
        let mut out = String::new();
        write_csv_record(&mut out, self.columns.iter().map(|c| c.to_string()));
        for row in &self.rows {
            write_csv_record(&mut out, row.iter().map(render_value));
        }
        out.trim().to_string()
    }

    /// One `NAME [TYPE]` line per column.
    pub fn types_out(&self) -> String {
        self.columns
            .iter()
            .zip(&self.column_types)
            .map(|(c, t)| format!("{c} [{t}]"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Sorted, de-duplicated column names present in both sets.
pub fn shared_columns(a: &ResultSet, b: &ResultSet) -> Vec<String> {
    let mut shared: Vec<String> = a
        .columns
        .iter()
        .filter(|c| b.columns.contains(c))
        .cloned()
        .collect();
    shared.sort();
    shared.dedup();
    shared
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Integer(_) | Value::Real(_) => 1,
        Value::Text(_) => 2,
        Value::Blob(_) => 3,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(x), Value::Real(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Real(x), Value::Integer(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Blob(x), Value::Blob(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => render_real(*r),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => hex::encode(b),
    }
}

fn render_real(r: f64) -> String {
    if r.is_finite() && r.fract() == 0.0 && r.abs() < 1e16 {
        format!("{r:.1}")
    } else {
        r.to_string()
    }
}

fn write_csv_record(out: &mut String, fields: impl Iterator<Item = String>) {
    let fields: Vec<String> = fields.collect();
    if fields.len() == 1 && fields[0].is_empty() {
        // a lone empty field would otherwise vanish as a blank line
        out.push_str("\"\"\n");
        return;
    }
    let quoted: Vec<String> = fields.iter().map(|f| quote_csv_field(f)).collect();
    out.push_str(&quoted.join(","));
    out.push('\n');
}

fn quote_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
