use super::{Expect, Outcome, OutputBuffer, Pattern, Spawn};
use crate::error::{Result, SftpError};
use crate::session::SftpCommand;
use crate::utils::mutex::{safe_lock_or_recover, safe_lock_with_context};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One thing the scripted child does when a wait needs more output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print this text.
    Output(String),
    /// Print nothing until the wait gives up.
    Silence,
    /// Exit, closing the output stream.
    Exit,
    /// Stop reading input. Later writes fail with a broken pipe.
    CloseInput,
}

/// What a scripted child observed, shared with the test that drives it.
#[derive(Debug, Default)]
pub struct Transcript {
    pub spawned: Vec<SftpCommand>,
    pub sent: Vec<String>,
    pub waits: usize,
    pub closed: bool,
}

/// An in-memory child process that replays a script of output.
///
/// Each wait consumes steps until a pattern matches, a [`Step::Silence`]
/// is reached (timeout) or the script runs out or exits (end of stream).
/// Matching goes through the same [`OutputBuffer`] the pty process uses.
pub struct ScriptedProcess {
    steps: VecDeque<Step>,
    buffer: OutputBuffer,
    transcript: Arc<Mutex<Transcript>>,
    eof: bool,
    input_closed: bool,
}

impl ScriptedProcess {
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Step>,
    {
        Self {
            steps: steps.into_iter().collect(),
            buffer: OutputBuffer::new(),
            transcript: Arc::new(Mutex::new(Transcript::default())),
            eof: false,
            input_closed: false,
        }
    }

    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    fn record(&self) -> MutexGuard<'_, Transcript> {
        safe_lock_or_recover(&self.transcript)
    }
}

impl Expect for ScriptedProcess {
    fn send(&mut self, text: &str) -> Result<()> {
        if self.eof {
            return Err(SftpError::StreamEnded);
        }
        if self.input_closed {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        self.record().sent.push(text.to_string());
        Ok(())
    }

    fn expect(&mut self, patterns: &[&Pattern], _timeout: Duration) -> Result<Outcome> {
        self.record().waits += 1;
        loop {
            if let Some(m) = self.buffer.take_match(patterns) {
                return Ok(Outcome::Matched(m));
            }
            if self.eof {
                return Ok(Outcome::Eof(self.buffer.take_all()));
            }
            match self.steps.pop_front() {
                Some(Step::Output(text)) => self.buffer.push(&text),
                Some(Step::Silence) => return Ok(Outcome::Timeout),
                Some(Step::CloseInput) => self.input_closed = true,
                Some(Step::Exit) | None => self.eof = true,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.eof = true;
        self.record().closed = true;
        Ok(())
    }
}

/// Hands out a prepared [`ScriptedProcess`] for the next login.
pub struct ScriptedSpawner {
    process: Mutex<Option<ScriptedProcess>>,
    transcript: Arc<Mutex<Transcript>>,
}

impl ScriptedSpawner {
    pub fn new(process: ScriptedProcess) -> Self {
        let transcript = process.transcript();
        Self {
            process: Mutex::new(Some(process)),
            transcript,
        }
    }

    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }
}

impl Spawn for ScriptedSpawner {
    fn spawn(&self, command: &SftpCommand) -> Result<Box<dyn Expect>> {
        let process = safe_lock_with_context(&self.process, "Failed to lock scripted process")?
            .take()
            .ok_or_else(|| SftpError::Spawn("Scripted process already spawned".to_string()))?;
        process.record().spawned.push(command.clone());
        Ok(Box::new(process))
    }
}
