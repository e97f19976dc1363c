//! Feedback command stream sent to the grading platform.
//!
//! Feedback is a strictly nested tree: judgement > tab > context > testcase
//! > test. Every node is opened and closed by its own command.

pub mod memory;
pub mod stream;

pub use memory::MemorySink;
pub use stream::JsonStream;

use crate::errors::JudgeFailure;
use crate::model::{AnnotationSeverity, Check, Message, MessageFormat, Status};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    StartJudgement,
    CloseJudgement {
        accepted: bool,
        status: Status,
    },
    StartTab {
        title: String,
    },
    CloseTab,
    StartContext,
    CloseContext {
        accepted: bool,
    },
    StartTestcase {
        description: Message,
    },
    CloseTestcase {
        accepted: bool,
    },
    StartTest {
        description: Message,
        expected: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<MessageFormat>,
    },
    CloseTest {
        generated: String,
        status: Status,
        accepted: bool,
    },
    AppendMessage {
        message: Message,
    },
    AnnotateCode {
        row: usize,
        text: String,
        #[serde(rename = "type")]
        severity: AnnotationSeverity,
    },
}

/// Destination of the command stream.
pub trait FeedbackSink {
    fn emit(&mut self, command: Command);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Judgement,
    Tab,
    Context,
    TestCase,
    Test,
}

/// Writes commands to a sink while keeping track of open scopes.
pub struct Reporter<'a> {
    sink: &'a mut dyn FeedbackSink,
    stack: Vec<ScopeKind>,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut dyn FeedbackSink) -> Self {
        Self {
            sink,
            stack: Vec::new(),
        }
    }

    fn open(&mut self, kind: ScopeKind, command: Command) {
        self.stack.push(kind);
        self.sink.emit(command);
    }

    fn close(&mut self, kind: ScopeKind, command: Command) {
        let top = self.stack.pop();
        if top != Some(kind) {
            tracing::error!(event = "judge.report.nesting", expected = ?kind, found = ?top);
        }
        debug_assert_eq!(top, Some(kind), "feedback scopes closed out of order");
        self.sink.emit(command);
    }

    pub fn start_judgement(&mut self) {
        self.open(ScopeKind::Judgement, Command::StartJudgement);
    }

    pub fn close_judgement(&mut self, accepted: bool, status: Status) {
        self.close(
            ScopeKind::Judgement,
            Command::CloseJudgement { accepted, status },
        );
    }

    pub fn start_tab(&mut self, title: impl Into<String>) {
        self.open(
            ScopeKind::Tab,
            Command::StartTab {
                title: title.into(),
            },
        );
    }

    pub fn close_tab(&mut self) {
        self.close(ScopeKind::Tab, Command::CloseTab);
    }

    pub fn start_context(&mut self) {
        self.open(ScopeKind::Context, Command::StartContext);
    }

    pub fn close_context(&mut self, accepted: bool) {
        self.close(ScopeKind::Context, Command::CloseContext { accepted });
    }

    pub fn start_testcase(&mut self, description: Message) {
        self.open(ScopeKind::TestCase, Command::StartTestcase { description });
    }

    pub fn close_testcase(&mut self, accepted: bool) {
        self.close(ScopeKind::TestCase, Command::CloseTestcase { accepted });
    }

    pub fn start_test(
        &mut self,
        description: Message,
        expected: String,
        format: Option<MessageFormat>,
    ) {
        self.open(
            ScopeKind::Test,
            Command::StartTest {
                description,
                expected,
                format,
            },
        );
    }

    pub fn close_test(&mut self, generated: String, status: Status) {
        let accepted = status.is_correct();
        self.close(
            ScopeKind::Test,
            Command::CloseTest {
                generated,
                status,
                accepted,
            },
        );
    }

    pub fn message(&mut self, message: Message) {
        self.sink.emit(Command::AppendMessage { message });
    }

    pub fn annotate(&mut self, row: usize, text: impl Into<String>, severity: AnnotationSeverity) {
        self.sink.emit(Command::AnnotateCode {
            row,
            text: text.into(),
            severity,
        });
    }

    /// Emits one check as a complete test scope.
    pub fn check(&mut self, check: &Check) {
        self.start_test(
            check.description.clone(),
            check.expected.clone(),
            check.format,
        );
        for note in &check.notes {
            self.message(note.clone());
        }
        self.close_test(check.generated.clone(), check.status.clone());
    }

    /// Closes the innermost scope, of kind `kind`, because of `failure`.
    ///
    /// The failure's message is rendered here if no inner scope took it yet.
    pub fn unwind(&mut self, kind: ScopeKind, failure: &mut JudgeFailure) {
        if let Some(message) = failure.message.take() {
            self.message(message);
        }
        match kind {
            ScopeKind::Judgement => self.close_judgement(false, failure.status.clone()),
            ScopeKind::Tab => self.close_tab(),
            ScopeKind::Context => self.close_context(false),
            ScopeKind::TestCase => self.close_testcase(false),
            ScopeKind::Test => self.close_test(String::new(), failure.status.clone()),
        }
    }
}
