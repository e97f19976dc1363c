use super::{Command, FeedbackSink};
use anyhow::Context;
use std::io::Write;

/// Newline-delimited JSON commands on a writer.
///
/// Emission cannot fail mid-judgement; the first write error is kept and
/// surfaced by [`JsonStream::finish`], later commands are dropped.
pub struct JsonStream<W: Write> {
    writer: W,
    error: Option<anyhow::Error>,
}

impl<W: Write> JsonStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush().context("failed to flush feedback stream")?;
        Ok(self.writer)
    }

    fn write_command(&mut self, command: &Command) -> anyhow::Result<()> {
        let line = serde_json::to_string(command).context("failed to encode feedback command")?;
        writeln!(self.writer, "{line}").context("failed to write feedback command")?;
        Ok(())
    }
}

impl<W: Write> FeedbackSink for JsonStream<W> {
    fn emit(&mut self, command: Command) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_command(&command) {
            tracing::error!(event = "judge.report.write_failed", error = %e);
            self.error = Some(e);
        }
    }
}
