use crate::model::{Message, MessageFormat, Status};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Feedback scope at which a failure stops unwinding.
///
/// Scopes below the recovery point close themselves as not accepted; the
/// recovery scope records the failure and lets its siblings run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverAt {
    Context,
    Tab,
    Judgement,
}

/// A reportable judging failure.
///
/// The attached message is rendered once, by the innermost scope that sees
/// the failure, and is taken out afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeFailure {
    pub status: Status,
    pub message: Option<Message>,
    pub recover_at: RecoverAt,
}

impl JudgeFailure {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            message: None,
            recover_at: RecoverAt::Judgement,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Shorthand for a staff-only diagnostic in code format.
    pub fn with_staff_detail(self, detail: impl Into<String>) -> Self {
        self.with_message(Message::new(MessageFormat::Code, detail).for_staff())
    }

    pub fn recover_at(mut self, scope: RecoverAt) -> Self {
        self.recover_at = scope;
        self
    }
}

impl fmt::Display for JudgeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status.human)?;
        if let Some(m) = &self.message {
            write!(f, ": {}", m.description)?;
        }
        Ok(())
    }
}

impl std::error::Error for JudgeFailure {}
