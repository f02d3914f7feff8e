use super::Session;
use crate::error::{InteractionError, Result, SftpError};
use crate::expect::{Outcome, Pattern};
use crate::taxonomy::ErrorKind;
use std::time::Duration;
use tracing::debug;

/// What a command printed before the client came back to its prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command line as sent, without the newline.
    pub command: String,
    /// Everything consumed before the prompt, including the echoed command.
    pub before: String,
}

impl Session {
    /// Send `command` and wait for the prompt, watching for `errors`.
    ///
    /// Error patterns are tried before the prompt. A matched error is
    /// returned as [`SftpError::Interaction`] and the session stays usable;
    /// a timeout or end of stream closes the session.
    pub fn exec(&mut self, command: &str, errors: &[ErrorKind]) -> Result<CommandOutput> {
        let timeout = self.timeout();
        self.exec_with_timeout(command, errors, timeout)
    }

    pub fn exec_with_timeout(
        &mut self,
        command: &str,
        errors: &[ErrorKind],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        self.require_authenticated()?;
        let _enter = self.span.clone().entered();

        let mut patterns: Vec<&Pattern> = Vec::with_capacity(errors.len() + 1);
        for kind in errors {
            patterns.push(kind.compiled()?);
        }
        let prompt = self.prompt.clone();
        patterns.push(&prompt);

        debug!(command, "sending command");
        let process = self.process_mut()?;
        process.send_line(command)?;
        let outcome = process.expect(&patterns, timeout)?;

        match outcome {
            Outcome::Matched(m) if m.index == errors.len() => {
                debug!(index = m.index, "prompt returned");
                Ok(CommandOutput {
                    command: command.to_string(),
                    before: m.before,
                })
            }
            Outcome::Matched(m) => {
                let kind = errors[m.index];
                debug!(index = m.index, ?kind, "client reported an error");
                // The rest of the message and the next prompt belong to
                // this command too
                self.finish_after_error(command, timeout)?;
                Err(InteractionError::new(kind).into())
            }
            Outcome::Timeout => {
                self.close();
                Err(SftpError::CommandTimeout {
                    command: command.to_string(),
                })
            }
            Outcome::Eof(_) => {
                self.close();
                Err(SftpError::StreamEnded)
            }
        }
    }

    /// Consume output up to the prompt that follows an error message.
    fn finish_after_error(&mut self, command: &str, timeout: Duration) -> Result<()> {
        let prompt = self.prompt.clone();
        match self.process_mut()?.expect(&[&prompt], timeout)? {
            Outcome::Matched(_) => Ok(()),
            Outcome::Timeout => {
                self.close();
                Err(SftpError::CommandTimeout {
                    command: command.to_string(),
                })
            }
            Outcome::Eof(_) => {
                self.close();
                Err(SftpError::StreamEnded)
            }
        }
    }
}

/// Join the non-empty parts of a command line with single spaces.
pub(crate) fn command_line(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
