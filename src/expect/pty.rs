use super::{Expect, Outcome, OutputBuffer, Pattern, Spawn};
use crate::error::{Result, SftpError};
use crate::models::{PtyDimensions, PTY_BUFFER_SIZE};
use crate::session::SftpCommand;
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Spawns the sftp client on a native pseudo-terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PtySpawner {
    pub size: PtyDimensions,
}

impl PtySpawner {
    pub fn new(size: PtyDimensions) -> Self {
        Self { size }
    }
}

impl Spawn for PtySpawner {
    fn spawn(&self, command: &SftpCommand) -> Result<Box<dyn Expect>> {
        Ok(Box::new(PtyProcess::spawn(command, self.size)?))
    }
}

/// A child process attached to a pseudo-terminal.
///
/// A reader thread forwards everything the child prints over a channel;
/// `expect` drains the channel into an [`OutputBuffer`] until a pattern
/// matches or the deadline passes.
pub struct PtyProcess {
    master: Box<dyn portable_pty::MasterPty + Send>,
    writer: Option<Box<dyn Write + Send>>,
    child: Option<Box<dyn portable_pty::Child + Send + Sync>>,
    reader_handle: Option<JoinHandle<()>>,
    output: Receiver<String>,
    buffer: OutputBuffer,
    eof: bool,
}

impl PtyProcess {
    pub fn spawn(command: &SftpCommand, size: PtyDimensions) -> Result<Self> {
        let pty_system = NativePtySystem::default();

        let pair = pty_system
            .openpty(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SftpError::Spawn(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&command.program);
        cmd.args(&command.args);
        // Prompts and error messages are matched in English
        cmd.env("LC_ALL", "C");

        debug!(command = %command, "spawning sftp client");
        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SftpError::Spawn(e.to_string()))?;
        // Keeping the slave open would hide the child's exit from the reader
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SftpError::Spawn(e.to_string()))?;
        let master = pair.master;
        let writer = master
            .take_writer()
            .map_err(|e| SftpError::Spawn(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        let reader_handle = spawn_reader_thread(reader, tx);

        Ok(Self {
            master,
            writer: Some(writer),
            child: Some(child),
            reader_handle: Some(reader_handle),
            output: rx,
            buffer: OutputBuffer::new(),
            eof: false,
        })
    }

    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|child| child.process_id())
    }

    pub fn resize(&self, size: PtyDimensions) -> Result<()> {
        self.master
            .resize(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SftpError::Io(std::io::Error::other(e.to_string())))
    }
}

impl Expect for PtyProcess {
    fn send(&mut self, text: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(SftpError::StreamEnded)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn expect(&mut self, patterns: &[&Pattern], timeout: Duration) -> Result<Outcome> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(m) = self.buffer.take_match(patterns) {
                return Ok(Outcome::Matched(m));
            }
            if self.eof {
                return Ok(Outcome::Eof(self.buffer.take_all()));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Outcome::Timeout);
            }

            match self.output.recv_timeout(remaining) {
                Ok(chunk) => {
                    self.buffer.push(&chunk);
                    // Drain whatever else already arrived before searching again
                    while let Ok(chunk) = self.output.try_recv() {
                        self.buffer.push(&chunk);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(Outcome::Timeout),
                Err(RecvTimeoutError::Disconnected) => self.eof = true,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the writer signals EOF to the client
        drop(self.writer.take());

        if let Some(mut child) = self.child.take() {
            let should_kill = match child.try_wait() {
                Ok(Some(_)) => false,
                Ok(None) => true,
                Err(e) => {
                    warn!("Failed to poll sftp child: {}", e);
                    true
                }
            };

            if should_kill {
                debug!("sftp child still running, killing");
                if let Err(e) = child.kill() {
                    warn!("Failed to kill sftp child: {}", e);
                }
            }

            child.wait()?;
        }

        // A grandchild (ssh) may still hold the terminal open; the reader
        // then exits on its own once it does, so only join a finished thread.
        if let Some(handle) = self.reader_handle.take() {
            if handle.is_finished() && handle.join().is_err() {
                warn!("pty reader thread panicked");
            }
        }
        self.eof = true;
        Ok(())
    }
}

impl Drop for PtyProcess {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close sftp child: {}", e);
        }
    }
}

/// Read pty output on a background thread and forward it as text.
///
/// UTF-8 sequences split across reads are held back until complete. The
/// sender is dropped when the child's side of the terminal closes.
fn spawn_reader_thread(mut reader: Box<dyn Read + Send>, tx: Sender<String>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = [0u8; PTY_BUFFER_SIZE];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(n) if n > 0 => {
                    pending.extend_from_slice(&buf[..n]);
                    let text = take_utf8_prefix(&mut pending);
                    if !text.is_empty() && tx.send(text).is_err() {
                        break;
                    }
                }
                _ => {
                    if !pending.is_empty() {
                        let _ = tx.send(String::from_utf8_lossy(&pending).into_owned());
                    }
                    break;
                }
            }
        }
    })
}

/// Decode the longest complete prefix of `pending`, leaving an incomplete
/// trailing sequence in place. Invalid bytes are replaced.
fn take_utf8_prefix(pending: &mut Vec<u8>) -> String {
    match std::str::from_utf8(pending) {
        Ok(text) => {
            let text = text.to_string();
            pending.clear();
            text
        }
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let rest = pending.split_off(valid);
            let text = String::from_utf8_lossy(pending).into_owned();
            *pending = rest;
            text
        }
        Err(_) => {
            let text = String::from_utf8_lossy(pending).into_owned();
            pending.clear();
            text
        }
    }
}
