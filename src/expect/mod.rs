// Expect module - pattern-driven interaction with a child process
mod buffer;
mod pattern;
mod pty;
#[cfg(any(test, feature = "test-support"))]
mod scripted;

pub use buffer::OutputBuffer;
pub use pattern::Pattern;
pub use pty::{PtyProcess, PtySpawner};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::{ScriptedProcess, ScriptedSpawner, Step, Transcript};

use crate::error::Result;
use crate::session::SftpCommand;
use std::time::Duration;

/// A successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position of the matching pattern in the list that was waited on.
    pub index: usize,
    /// Output consumed before the match.
    pub before: String,
    /// The text the pattern matched.
    pub matched: String,
}

/// How a wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched(Match),
    /// No pattern matched before the deadline. Buffered output is kept.
    Timeout,
    /// The child closed its output. Carries whatever was left unmatched.
    Eof(String),
}

/// Capability a session needs from its child process.
pub trait Expect: Send {
    fn send(&mut self, text: &str) -> Result<()>;

    fn send_line(&mut self, line: &str) -> Result<()> {
        self.send(&format!("{}\n", line))
    }

    /// Block until one of `patterns` matches, the timeout expires or the
    /// output stream ends.
    fn expect(&mut self, patterns: &[&Pattern], timeout: Duration) -> Result<Outcome>;

    /// Terminate the child and release its terminal. Safe to call twice.
    fn close(&mut self) -> Result<()>;
}

/// Starts the sftp client for a login.
pub trait Spawn: Send {
    fn spawn(&self, command: &SftpCommand) -> Result<Box<dyn Expect>>;
}
