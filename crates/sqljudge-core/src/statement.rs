//! SQL statement model.
//!
//! A raw script is tokenized once with the SQLite dialect of `sqlparser`,
//! split into statements at top-level semicolons, and every statement keeps
//! a comment-free text (used for execution), a flat symbol list and a
//! canonical single-spaced form (used for policy matching).

use crate::translator::Text;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer, TokenizerError, Whitespace};
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub struct StatementError(pub TokenizerError);

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not tokenize SQL: {}", self.0)
    }
}

impl std::error::Error for StatementError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Replace,
    Create,
    Drop,
    Alter,
    Pragma,
    Unknown,
}

impl StatementType {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "SELECT" => StatementType::Select,
            "INSERT" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "REPLACE" => StatementType::Replace,
            "CREATE" => StatementType::Create,
            "DROP" => StatementType::Drop,
            "ALTER" => StatementType::Alter,
            "PRAGMA" => StatementType::Pragma,
            _ => StatementType::Unknown,
        }
    }

    /// Keywords that can follow a common table expression list.
    fn from_dml_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SELECT" | "INSERT" | "UPDATE" | "DELETE" | "REPLACE" => {
                Some(Self::from_keyword(keyword))
            }
            _ => None,
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementType::Select => "SELECT",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
            StatementType::Replace => "REPLACE",
            StatementType::Create => "CREATE",
            StatementType::Drop => "DROP",
            StatementType::Alter => "ALTER",
            StatementType::Pragma => "PRAGMA",
            StatementType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Regex rule lists a statement is checked against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyRules {
    #[serde(default)]
    pub forbidden_symbol: Vec<String>,
    #[serde(default)]
    pub mandatory_symbol: Vec<String>,
    #[serde(default)]
    pub forbidden_full: Vec<String>,
    #[serde(default)]
    pub mandatory_full: Vec<String>,
}

impl PolicyRules {
    pub fn is_empty(&self) -> bool {
        self.forbidden_symbol.is_empty()
            && self.mandatory_symbol.is_empty()
            && self.forbidden_full.is_empty()
            && self.mandatory_full.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    ForbiddenSymbol,
    MandatorySymbol,
    ForbiddenFull,
    MandatoryFull,
}

/// First rule a statement breaks. `value` is the offending symbol for a
/// forbidden symbol, the pattern otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub rule: PolicyRule,
    pub value: String,
}

impl PolicyViolation {
    pub fn text(&self) -> Text {
        let value = self.value.clone();
        match self.rule {
            PolicyRule::ForbiddenSymbol => Text::SubmissionForbiddenSymbolRegex { value },
            PolicyRule::MandatorySymbol => Text::SubmissionMandatorySymbolRegex { value },
            PolicyRule::ForbiddenFull => Text::SubmissionForbiddenFullRegex { value },
            PolicyRule::MandatoryFull => Text::SubmissionMandatoryFullRegex { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    raw: String,
    normalized: String,
    symbols: Vec<String>,
    canonical: String,
    statement_type: StatementType,
    ordered: bool,
}

/// Splits a raw script into statements.
///
/// Empty and whitespace/comment-only input yields no statements. A `;`
/// inside the body of a `CREATE ... BEGIN ... END` does not end the
/// statement; anywhere else it does, even after an unclosed `CASE`.
pub fn split(raw: &str) -> Result<Vec<Statement>, StatementError> {
    let dialect = SQLiteDialect {};
    let tokens = Tokenizer::new(&dialect, raw)
        .with_unescape(false)
        .tokenize()
        .map_err(StatementError)?;

    let mut statements = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    // CASE depth is tracked so its END does not close a body
    let mut cases = 0usize;
    let mut bodies = 0usize;

    for token in tokens {
        if matches!(token, Token::EOF) {
            continue;
        }
        let boundary = matches!(token, Token::SemiColon) && bodies == 0;

        if let Token::Word(w) = &token {
            if w.quote_style.is_none() {
                match w.value.to_ascii_uppercase().as_str() {
                    "CASE" => cases += 1,
                    "BEGIN" if first_keyword(&current).as_deref() == Some("CREATE") => bodies += 1,
                    "END" if cases > 0 => cases -= 1,
                    "END" if bodies > 0 => bodies -= 1,
                    _ => {}
                }
            }
        }

        current.push(token);
        if boundary {
            cases = 0;
            statements.extend(Statement::from_tokens(std::mem::take(&mut current)));
        }
    }
    statements.extend(Statement::from_tokens(current));

    Ok(statements)
}

impl Statement {
    /// Builds a statement from its tokens; `None` when nothing but
    /// whitespace and comments remain.
    fn from_tokens(tokens: Vec<Token>) -> Option<Self> {
        let raw: String = tokens.iter().map(|t| t.to_string()).collect();
        let code: Vec<Token> = tokens.into_iter().map(strip_comment).collect();

        let normalized = code
            .iter()
            .map(|t| t.to_string())
            .collect::<String>()
            .trim()
            .to_string();
        if normalized.is_empty() {
            return None;
        }

        let symbols = flatten_symbols(&code);
        let canonical = join_symbols(&symbols);

        Some(Self {
            raw: raw.trim().to_string(),
            normalized,
            symbols,
            canonical,
            statement_type: classify(&code),
            ordered: has_top_level_order_by(&code),
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Comment-free text; this is what gets executed.
    pub fn normalized_text(&self) -> &str {
        &self.normalized
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn is_select(&self) -> bool {
        self.statement_type == StatementType::Select
    }

    pub fn is_pragma(&self) -> bool {
        self.canonical
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("PRAGMA"))
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn has_ending_semicolon(&self) -> bool {
        self.symbols.last().is_some_and(|s| s == ";")
    }

    /// First symbol fully matching `pattern` (case-insensitive).
    pub fn first_match_regex(&self, pattern: &str) -> Result<Option<&str>, regex::Error> {
        let re = full_match(pattern)?;
        Ok(self.find_symbol(&re))
    }

    /// First symbol whose lowercase form is one of `words` (case-insensitive).
    pub fn first_match_array<S: AsRef<str>>(&self, words: &[S]) -> Option<&str> {
        let wanted: std::collections::HashSet<String> =
            words.iter().map(|w| w.as_ref().to_lowercase()).collect();
        self.symbols
            .iter()
            .find(|s| wanted.contains(&s.to_lowercase()))
            .map(String::as_str)
    }

    /// Checks the rule lists in their fixed order and reports the first
    /// violation.
    pub fn match_policy(&self, rules: &PolicyRules) -> Result<Option<PolicyViolation>, regex::Error> {
        for pattern in &rules.forbidden_symbol {
            if let Some(symbol) = self.find_symbol(&full_match(pattern)?) {
                return Ok(Some(PolicyViolation {
                    rule: PolicyRule::ForbiddenSymbol,
                    value: symbol.to_string(),
                }));
            }
        }

        for pattern in &rules.mandatory_symbol {
            if self.find_symbol(&full_match(pattern)?).is_none() {
                return Ok(Some(PolicyViolation {
                    rule: PolicyRule::MandatorySymbol,
                    value: pattern.clone(),
                }));
            }
        }

        for pattern in &rules.forbidden_full {
            if full_match(pattern)?.is_match(&self.canonical) {
                return Ok(Some(PolicyViolation {
                    rule: PolicyRule::ForbiddenFull,
                    value: pattern.clone(),
                }));
            }
        }

        for pattern in &rules.mandatory_full {
            if !full_match(pattern)?.is_match(&self.canonical) {
                return Ok(Some(PolicyViolation {
                    rule: PolicyRule::MandatoryFull,
                    value: pattern.clone(),
                }));
            }
        }

        Ok(None)
    }

    fn find_symbol(&self, re: &Regex) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| re.is_match(s))
            .map(String::as_str)
    }
}

fn full_match(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\A(?:{})\z", pattern))
        .case_insensitive(true)
        .build()
}

fn strip_comment(token: Token) -> Token {
    match token {
        Token::Whitespace(Whitespace::SingleLineComment { .. }) => {
            Token::Whitespace(Whitespace::Newline)
        }
        Token::Whitespace(Whitespace::MultiLineComment(_)) => Token::Whitespace(Whitespace::Space),
        other => other,
    }
}

fn first_keyword(tokens: &[Token]) -> Option<String> {
    tokens.iter().find_map(|t| match t {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_ascii_uppercase()),
        _ => None,
    })
}

/// Renders tokens to symbols. A bracket run the lexer emits piecewise is
/// glued back together, whitespace included.
fn flatten_symbols(tokens: &[Token]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    let mut in_brackets = false;

    for token in tokens {
        let piece = token.to_string();
        match symbols.last_mut() {
            Some(last) if in_brackets => last.push_str(&piece),
            _ => symbols.push(piece),
        }
        match token {
            Token::LBracket => in_brackets = true,
            Token::RBracket => in_brackets = false,
            _ => {}
        }
    }

    symbols
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_symbols(symbols: &[String]) -> String {
    let mut out = String::new();
    for symbol in symbols {
        if !out.is_empty() && symbol == "," {
            out.pop();
            out.push_str(", ");
        } else {
            out.push_str(symbol);
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}

fn classify(tokens: &[Token]) -> StatementType {
    let mut depth = 0usize;
    let mut seen_word = false;
    let mut in_cte = false;

    for token in tokens {
        match token {
            Token::LParen if seen_word => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Word(w) if w.quote_style.is_none() => {
                seen_word = true;
                if depth > 0 {
                    continue;
                }
                let keyword = w.value.to_ascii_uppercase();
                if in_cte {
                    if let Some(t) = StatementType::from_dml_keyword(&keyword) {
                        return t;
                    }
                } else if keyword == "WITH" {
                    in_cte = true;
                } else {
                    return StatementType::from_keyword(&keyword);
                }
            }
            _ => {}
        }
    }
    StatementType::Unknown
}

fn has_top_level_order_by(tokens: &[Token]) -> bool {
    let mut depth = 0usize;
    let mut after_order = false;

    for token in tokens {
        match token {
            Token::Whitespace(_) => continue,
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            Token::Word(w) if depth == 0 && w.quote_style.is_none() => {
                if after_order && w.value.eq_ignore_ascii_case("BY") {
                    return true;
                }
                after_order = w.value.eq_ignore_ascii_case("ORDER");
                continue;
            }
            _ => {}
        }
        after_order = false;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(raw: &str) -> Statement {
        let mut statements = split(raw).unwrap();
        assert_eq!(statements.len(), 1, "expected one statement in {raw:?}");
        statements.remove(0)
    }

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_split_two_statements_with_comments() {
        let statements = split(
            "-- First query:\n        SELECT * from Users Where \";x\" = 1;\n        -- 2nd query:\n        SELECT 1 /* trailing */",
        )
        .unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0].normalized_text(),
            "SELECT * from Users Where \";x\" = 1;"
        );
        assert!(statements[0].has_ending_semicolon());
        assert_eq!(statements[1].normalized_text(), "SELECT 1");
        assert!(!statements[1].has_ending_semicolon());
    }

    #[test]
    fn test_split_empty_and_blank_input() {
        assert!(split("").unwrap().is_empty());
        assert!(split("\n\r").unwrap().is_empty());
        assert!(split("   \t  ").unwrap().is_empty());
        assert!(split("-- only a comment\n/* and another */").unwrap().is_empty());
    }

    #[test]
    fn test_split_ignores_commented_out_alternative() {
        let statements = split(
            "\n SELECT NAME, RATE\n FROM CUSTOMER,\n     DISCOUNT_CODE\n WHERE CUSTOMER.DISCOUNT_CODE = DISCOUNT_CODE.DISCOUNT_CODE;\n -- Alternatief\n -- SELECT NAME, RATE\n -- FROM CUSTOMER;\n",
        )
        .unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_split_keeps_trigger_body_together() {
        let statements = split(
            "CREATE TRIGGER trg AFTER INSERT ON t BEGIN UPDATE t SET a = 1; DELETE FROM u; END; SELECT 1;",
        )
        .unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].statement_type(), StatementType::Create);
        assert!(statements[0].normalized_text().ends_with("END;"));
        assert!(statements[1].is_select());
    }

    #[test]
    fn test_split_reports_tokenizer_error() {
        let err = split("SELECT 'unterminated").unwrap_err();
        assert!(err.to_string().contains("Unterminated string literal"), "{err}");
    }

    #[test]
    fn test_split_unclosed_case_does_not_swallow_next_statement() {
        let statements =
            split("SELECT CASE WHEN 1 THEN name FROM users;\nSELECT id FROM users;").unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].normalized_text(), "SELECT id FROM users;");
    }

    #[test]
    fn test_split_case_inside_trigger_body() {
        let statements = split(
            "CREATE TRIGGER trg AFTER INSERT ON t BEGIN \
             UPDATE t SET a = CASE WHEN a > 1 THEN 0 ELSE 1 END; END; SELECT 1;",
        )
        .unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].normalized_text().ends_with("END; END;"));
    }

    #[test]
    fn test_query_with_quoted_semicolon() {
        let q = single("SELECT * from Users Where \";\" = 1 ORdER BY Name ASC;");
        assert_eq!(
            q.normalized_text(),
            "SELECT * from Users Where \";\" = 1 ORdER BY Name ASC;"
        );
        assert!(q.has_ending_semicolon());
        assert!(q.is_select());
        assert!(q.is_ordered());
    }

    #[test]
    fn test_insert_select_is_not_select() {
        let q = single("--SELECT\n   INSERT INTO table2 /**/ SELECT * FROM Users Where \";ORDER BY\" = 1;");
        assert!(q.normalized_text().starts_with("INSERT INTO table2"));
        assert!(!q.normalized_text().contains("/**/"));
        assert!(q.has_ending_semicolon());
        assert!(!q.is_select());
        assert_eq!(q.statement_type(), StatementType::Insert);
        assert!(!q.is_ordered());
    }

    #[test]
    fn test_normalized_and_canonical() {
        let q = single("\n  SELeCT\n*\tFROm   USERS  \n\r");
        assert_eq!(q.normalized_text(), "SELeCT\n*\tFROm   USERS");
        assert_eq!(q.canonical_form(), "SELeCT * FROm USERS");

        let q = single("--Select all:\n        SELECT * FROM Customers;");
        assert_eq!(q.normalized_text(), "SELECT * FROM Customers;");
        assert_eq!(q.canonical_form(), "SELECT * FROM Customers ;");

        let q = single("SELECT * FROM Customers; --Select all:");
        assert_eq!(q.normalized_text(), "SELECT * FROM Customers;");

        let q = single("/* Select all employees whose compensation is\n greater than that of Pataballa. */\n SELECT * FROM Customers;");
        assert_eq!(q.canonical_form(), "SELECT * FROM Customers ;");
    }

    #[test]
    fn test_canonical_special_spacing() {
        let q = single("select'asdf'as[asdf]into[#MyTable]");
        assert_eq!(q.canonical_form(), "select 'asdf' as [asdf] into [#MyTable]");

        let q = single("SELECT(COUNT(id))FROM(users)where(id>5)");
        assert_eq!(
            q.canonical_form(),
            "SELECT ( COUNT ( id ) ) FROM ( users ) where ( id > 5 )"
        );

        let q = single("SELECT(count(name))[aaaaa],[name]as'test'FROM(sqlite_master);");
        assert_eq!(
            q.canonical_form(),
            "SELECT ( count ( name ) ) [aaaaa], [name] as 'test' FROM ( sqlite_master ) ;"
        );

        let q = single("SELECT'test'FROM[Customers]WHERE 1=1 OR '    like   ' LIKE'%%';");
        assert_eq!(
            q.canonical_form(),
            "SELECT 'test' FROM [Customers] WHERE 1 = 1 OR '    like   ' LIKE '%%' ;"
        );
    }

    #[test]
    fn test_bracket_identifier_with_whitespace_is_one_symbol() {
        let q = single("SELECT [first name], x FROM [my table];");
        assert_eq!(
            q.symbols(),
            &["SELECT", "[first name]", ",", "x", "FROM", "[my table]", ";"]
        );
    }

    #[test]
    fn test_is_select_is_pragma() {
        let q = single("\nSELECT *\n    from\n       users\n");
        assert_eq!(q.canonical_form(), "SELECT * from users");
        assert!(q.is_select());
        assert!(!q.is_pragma());

        let q = single("\n INSERT INTO table2\n SELECT * FROM table1\n WHERE condition;\n");
        assert_eq!(
            q.canonical_form(),
            "INSERT INTO table2 SELECT * FROM table1 WHERE condition ;"
        );
        assert!(!q.is_select());
        assert!(!q.is_pragma());

        let q = single("PRAGMA CASE_SENSITIVE_LIKE=ON;");
        assert_eq!(q.canonical_form(), "PRAGMA CASE_SENSITIVE_LIKE = ON ;");
        assert!(!q.is_select());
        assert!(q.is_pragma());

        let q = single("pragma foreign_keys = on");
        assert!(q.is_pragma());
    }

    #[test]
    fn test_is_ordered() {
        let q = single("SELECT column1, column2\n FROM table_name\n ORDER BY column1, column2 ASC;\n");
        assert_eq!(
            q.canonical_form(),
            "SELECT column1, column2 FROM table_name ORDER BY column1, column2 ASC ;"
        );
        assert!(q.is_ordered());

        let q = single("-- ORDER BY\n SELECT column1, column2\n FROM table_name\n");
        assert!(!q.is_ordered());

        let q = single("select * from users");
        assert!(!q.is_ordered());

        let q = single("select \"ORDER BY\" from users");
        assert_eq!(q.canonical_form(), "select \"ORDER BY\" from users");
        assert!(!q.is_ordered());

        let q = single("select 'ORDER BY' from [order by]");
        assert!(!q.is_ordered());

        let q = single("select \"ORDER BY\", (SELECT 1 ORDER BY test) from users");
        assert_eq!(
            q.canonical_form(),
            "select \"ORDER BY\", ( SELECT 1 ORDER BY test ) from users"
        );
        assert!(!q.is_ordered());

        let q = single("select name from users order\n   by name desc");
        assert!(q.is_ordered());
    }

    #[test]
    fn test_statement_type() {
        assert_eq!(
            single("select * from users WHERE zip LIKE 'test'").statement_type(),
            StatementType::Select
        );
        assert_eq!(
            single("INSERT INTO table_name (column) VALUES ('value');").statement_type(),
            StatementType::Insert
        );
        assert_eq!(
            single("DELETE FROM table_name WHERE condition;").statement_type(),
            StatementType::Delete
        );
        assert_eq!(
            single("WITH c AS (SELECT 1) UPDATE t SET a = (SELECT * FROM c);").statement_type(),
            StatementType::Update
        );
        assert_eq!(
            single("WITH RECURSIVE c(x) AS (SELECT 1) SELECT x FROM c;").statement_type(),
            StatementType::Select
        );
        assert_eq!(single("(SELECT 1)").statement_type(), StatementType::Select);
        assert_eq!(StatementType::Insert.to_string(), "INSERT");
    }

    #[test]
    fn test_match_regex_and_array() {
        let q = single("select * from users WHERE zip = 'LIKE'");
        assert_eq!(
            q.symbols(),
            &["select", "*", "from", "users", "WHERE", "zip", "=", "'LIKE'"]
        );
        assert_eq!(q.first_match_regex("select").unwrap(), Some("select"));
        assert_eq!(q.first_match_regex("sel").unwrap(), None);
        assert_eq!(q.first_match_regex("sel...").unwrap(), Some("select"));
        assert_eq!(q.first_match_regex("'LIKE'").unwrap(), Some("'LIKE'"));
        assert_eq!(q.first_match_regex("LIKE").unwrap(), None);

        assert_eq!(q.first_match_array(&["select"]), Some("select"));
        assert_eq!(q.first_match_array(&["sel..."]), None);
        assert_eq!(q.first_match_array(&["LIKE", "select"]), Some("select"));
        assert_eq!(q.first_match_array(&["SELECT"]), Some("select"));

        let q = single("DELETE FROM ARTISTS WHERE NAME LIKE '%Santana%';");
        assert_eq!(q.first_match_array(&["arTiSts"]), Some("ARTISTS"));
        assert_eq!(q.first_match_array(&["NAME", "arTiSts"]), Some("ARTISTS"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let q = single("select 1");
        assert!(q.first_match_regex("(").is_err());
    }

    #[test]
    fn test_match_policy_order() {
        let q = single("SELECT * FROM users WHERE name = 'test';");
        let rules = |fs: &[&str], ms: &[&str], ff: &[&str], mf: &[&str]| PolicyRules {
            forbidden_symbol: fs.iter().map(|s| s.to_string()).collect(),
            mandatory_symbol: ms.iter().map(|s| s.to_string()).collect(),
            forbidden_full: ff.iter().map(|s| s.to_string()).collect(),
            mandatory_full: mf.iter().map(|s| s.to_string()).collect(),
        };

        let v = q.match_policy(&rules(&["USERS"], &[], &[], &[])).unwrap().unwrap();
        assert_eq!(v.rule, PolicyRule::ForbiddenSymbol);
        assert_eq!(v.value, "users");

        let v = q.match_policy(&rules(&[], &["customers"], &[], &[])).unwrap().unwrap();
        assert_eq!(v.rule, PolicyRule::MandatorySymbol);
        assert_eq!(v.value, "customers");

        let v = q.match_policy(&rules(&[], &[], &[".*"], &[])).unwrap().unwrap();
        assert_eq!(v.rule, PolicyRule::ForbiddenFull);

        let v = q.match_policy(&rules(&[], &[], &[], &["select"])).unwrap().unwrap();
        assert_eq!(v.rule, PolicyRule::MandatoryFull);
        assert_eq!(v.value, "select");

        // forbidden symbols win over everything else
        let v = q
            .match_policy(&rules(&["\\*"], &["nope"], &[".*"], &["x"]))
            .unwrap()
            .unwrap();
        assert_eq!(v.rule, PolicyRule::ForbiddenSymbol);
        assert_eq!(v.value, "*");

        assert_eq!(q.match_policy(&rules(&["test"], &[], &[], &[])).unwrap(), None);
        assert_eq!(q.match_policy(&rules(&[], &[".test."], &[], &[])).unwrap(), None);
        assert_eq!(q.match_policy(&rules(&[], &[], &["insert .*"], &[])).unwrap(), None);
        assert_eq!(q.match_policy(&rules(&[], &[], &[], &["select .*"])).unwrap(), None);
        assert_eq!(q.match_policy(&PolicyRules::default()).unwrap(), None);
    }

    #[test]
    fn test_symbols_preserve_all_code_characters() {
        let inputs = [
            "SELECT a, b FROM t WHERE c = 'x  y' ORDER BY a; INSERT INTO t VALUES (1, 'q');",
            "select [weird name], \"quoted id\" from t -- tail\n;",
            "UPDATE t SET a = a + 1 /* bump */ WHERE id IN (1,2,3);",
        ];
        for input in inputs {
            let statements = split(input).unwrap();
            let rebuilt: String = statements
                .iter()
                .flat_map(|s| s.symbols().iter())
                .map(|s| strip_ws(s))
                .collect();
            let without_comments: String = statements
                .iter()
                .map(|s| strip_ws(s.normalized_text()))
                .collect();
            assert_eq!(rebuilt, without_comments, "input: {input}");
            for s in &statements {
                assert!(!s.symbols().is_empty());
            }
        }
    }

    #[test]
    fn test_canonical_round_trip_without_comments() {
        let q = single("SELECT id,name FROM users WHERE id>3;");
        let reparsed = single(q.canonical_form());
        assert_eq!(reparsed.symbols(), q.symbols());
        assert_eq!(q.canonical_form(), "SELECT id, name FROM users WHERE id > 3 ;");
    }

    #[test]
    fn test_raw_text_keeps_comments() {
        let q = single("SELECT 1 -- one\n;");
        assert!(q.raw_text().contains("-- one"));
        assert!(!q.normalized_text().contains("-- one"));
    }
}
