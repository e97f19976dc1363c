#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::{json, Value};
use sqljudge_core::model::{ErrorKind, Message, Verdict};
use sqljudge_core::report::{Command, MemorySink};
use sqljudge_core::{judge, parse_config};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const USERS: &str = "
    CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);
    INSERT INTO users VALUES (1, 'Charlie', 31), (2, 'alice', 25), (3, 'Bob', 40);
";

/// An exercise laid out the way the platform mounts it.
pub struct Exercise {
    pub dir: TempDir,
}

impl Exercise {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("evaluation"))?;
        fs::create_dir_all(dir.path().join("workdir"))?;
        Ok(Self { dir })
    }

    pub fn with_seed(sql: &str) -> anyhow::Result<Self> {
        let exercise = Self::new()?;
        exercise.seed("db.sqlite", sql)?;
        Ok(exercise)
    }

    pub fn resources(&self) -> PathBuf {
        self.dir.path().join("evaluation")
    }

    pub fn seed(&self, name: &str, sql: &str) -> anyhow::Result<()> {
        let conn = Connection::open(self.resources().join(name))?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Judges `submission` against `solution`; `options` is merged into
    /// the platform config.
    pub fn judge(&self, solution: &str, submission: &str, options: Value) -> anyhow::Result<Run> {
        fs::write(self.resources().join("solution.sql"), solution)?;
        let source = self.dir.path().join("submission.sql");
        fs::write(&source, submission)?;

        let mut config = json!({
            "memory_limit": 536870912,
            "time_limit": "10",
            "programming_language": "sql",
            "natural_language": "en",
            "resources": self.resources(),
            "source": source,
            "judge": self.dir.path(),
            "workdir": self.dir.path().join("workdir"),
        });
        if let (Some(base), Value::Object(extra)) = (config.as_object_mut(), options) {
            base.extend(extra);
        }

        let config = parse_config(&config.to_string())?;
        let mut sink = MemorySink::default();
        let verdict = judge(&config, &mut sink);
        Ok(Run {
            verdict,
            commands: sink.into_commands(),
        })
    }
}

pub struct Run {
    pub verdict: Verdict,
    pub commands: Vec<Command>,
}

/// One rendered test: description, expected, generated, accepted.
#[derive(Debug)]
pub struct RenderedTest {
    pub description: String,
    pub expected: String,
    pub generated: String,
    pub accepted: bool,
    pub kind: ErrorKind,
}

impl Run {
    pub fn tests(&self) -> Vec<RenderedTest> {
        let mut out = Vec::new();
        let mut open: Option<(String, String)> = None;
        for command in &self.commands {
            match command {
                Command::StartTest {
                    description,
                    expected,
                    ..
                } => open = Some((description.description.clone(), expected.clone())),
                Command::CloseTest {
                    generated,
                    status,
                    accepted,
                } => {
                    if let Some((description, expected)) = open.take() {
                        out.push(RenderedTest {
                            description,
                            expected,
                            generated: generated.clone(),
                            accepted: *accepted,
                            kind: status.kind,
                        });
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn messages(&self) -> Vec<&Message> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::AppendMessage { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn tabs(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::StartTab { title } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contexts(&self) -> Vec<bool> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::CloseContext { accepted } => Some(*accepted),
                _ => None,
            })
            .collect()
    }

    pub fn judgement(&self) -> (bool, ErrorKind) {
        match self.commands.last() {
            Some(Command::CloseJudgement { accepted, status }) => (*accepted, status.kind),
            other => panic!("stream does not end with close-judgement: {other:?}"),
        }
    }

    /// Starts and closes balance and the stream is a single judgement.
    pub fn assert_well_nested(&self) {
        let mut depth: i64 = 0;
        for (i, command) in self.commands.iter().enumerate() {
            match command {
                Command::StartJudgement
                | Command::StartTab { .. }
                | Command::StartContext
                | Command::StartTestcase { .. }
                | Command::StartTest { .. } => depth += 1,
                Command::CloseJudgement { .. }
                | Command::CloseTab
                | Command::CloseContext { .. }
                | Command::CloseTestcase { .. }
                | Command::CloseTest { .. } => depth -= 1,
                Command::AppendMessage { .. } | Command::AnnotateCode { .. } => {}
            }
            assert!(depth >= 0, "unbalanced close at {i}: {command:?}");
            if depth == 0 {
                assert_eq!(i, self.commands.len() - 1, "judgement closed early");
            }
        }
        assert_eq!(depth, 0);
    }
}
