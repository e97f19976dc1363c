use super::{Command, FeedbackSink};

/// Keeps every emitted command; used by tests and embedders.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    commands: Vec<Command>,
}

impl MemorySink {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl FeedbackSink for MemorySink {
    fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }
}
