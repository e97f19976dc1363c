use serde::{Deserialize, Serialize};

/// Outcome kinds understood by the grading platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[serde(rename = "internal error")]
    InternalError,
    #[serde(rename = "compilation error")]
    CompilationError,
    #[serde(rename = "runtime error")]
    RuntimeError,
    #[serde(rename = "wrong")]
    Wrong,
    #[serde(rename = "correct")]
    Correct,
    #[serde(rename = "memory limit exceeded")]
    MemoryLimitExceeded,
    #[serde(rename = "time limit exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "output limit exceeded")]
    OutputLimitExceeded,
}

impl ErrorKind {
    pub fn is_correct(&self) -> bool {
        matches!(self, ErrorKind::Correct)
    }
}

/// Status object as sent to the platform: the kind plus a translated summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    #[serde(rename = "enum")]
    pub kind: ErrorKind,
    pub human: String,
}

impl Status {
    pub fn is_correct(&self) -> bool {
        self.kind.is_correct()
    }
}

/// Who may see a message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Student,
    Staff,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MessageFormat {
    Plain,
    #[default]
    Text,
    Html,
    Markdown,
    Code,
    Sql,
    Csv,
    Callout,
    CalloutInfo,
    CalloutWarning,
    CalloutDanger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub description: String,
    pub format: MessageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
}

impl Message {
    pub fn new(format: MessageFormat, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            format,
            permission: None,
        }
    }

    pub fn for_student(mut self) -> Self {
        self.permission = Some(Permission::Student);
        self
    }

    pub fn for_staff(mut self) -> Self {
        self.permission = Some(Permission::Staff);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSeverity {
    Error,
    Warning,
    Info,
}

/// One graded comparison unit.
///
/// `notes` are informational messages rendered inside the check; they never
/// change its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub description: Message,
    pub expected: String,
    pub generated: String,
    pub format: Option<MessageFormat>,
    pub status: Status,
    pub notes: Vec<Message>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.status.is_correct()
    }
}

/// Summary handed back to the caller once the judgement scope is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub status: Status,
    pub contexts: usize,
    pub failed_contexts: usize,
}
