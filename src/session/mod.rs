// Session module - one logged-in sftp client and the commands sent to it
mod command;
mod exec;
mod login;
mod ops;

pub use command::SftpCommand;
pub use exec::CommandOutput;

use crate::error::{Result, SftpError};
use crate::expect::{Expect, Match, Outcome, Pattern, PtySpawner, Spawn};
use crate::models::{SessionSettings, SessionState};
use std::time::Duration;
use tracing::{debug, info, warn, Span};
use uuid::Uuid;

/// An interactive sftp client driven through its terminal.
///
/// Operations take `&mut self`: a session has one output stream, so at
/// most one command can be waiting on it. Independent sessions do not
/// share anything and can live on different threads.
pub struct Session {
    id: Uuid,
    settings: SessionSettings,
    prompt: Pattern,
    spawner: Box<dyn Spawn>,
    process: Option<Box<dyn Expect>>,
    state: SessionState,
    span: Span,
}

impl Session {
    /// A session that spawns the client on a native pseudo-terminal.
    pub fn new(settings: SessionSettings) -> Result<Self> {
        let spawner = PtySpawner::new(settings.pty);
        Self::with_spawner(settings, spawner)
    }

    /// A session that starts its client through `spawner`.
    pub fn with_spawner<S>(settings: SessionSettings, spawner: S) -> Result<Self>
    where
        S: Spawn + 'static,
    {
        let prompt = Pattern::regex(&settings.prompt)?;
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            settings,
            prompt,
            spawner: Box::new(spawner),
            process: None,
            state: SessionState::Unauthenticated,
            span: tracing::info_span!("sftp_session", id = %id, remote = tracing::field::Empty),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout()
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.settings.timeout_secs = timeout.as_secs().max(1);
    }

    /// Replace the pattern recognised as the ready prompt.
    pub fn set_prompt(&mut self, prompt: &str) -> Result<()> {
        self.prompt = Pattern::regex(prompt)?;
        self.settings.prompt = prompt.to_string();
        Ok(())
    }

    /// Wait for the next ready prompt.
    ///
    /// Returns the match, or `None` if the timeout (the session default
    /// when not given) expired first.
    pub fn wait_for_prompt(&mut self, timeout: Option<Duration>) -> Result<Option<Match>> {
        let timeout = timeout.unwrap_or_else(|| self.timeout());
        let _enter = self.span.clone().entered();
        let prompt = self.prompt.clone();
        match self.process_mut()?.expect(&[&prompt], timeout)? {
            Outcome::Matched(m) => Ok(Some(m)),
            Outcome::Timeout => Ok(None),
            Outcome::Eof(_) => {
                self.close();
                Err(SftpError::StreamEnded)
            }
        }
    }

    /// Leave the client and wait for it to exit.
    pub fn logout(&mut self) -> Result<()> {
        let _enter = self.span.clone().entered();
        if self.state != SessionState::Authenticated {
            self.close();
            return Ok(());
        }

        let timeout = self.timeout();
        let process = self.process_mut()?;
        let outcome = match process.send_line("exit") {
            Ok(()) => process.expect(&[], timeout),
            Err(e) => Err(e),
        };
        // The client is terminated whether or not it took the `exit`
        self.close();
        if outcome? == Outcome::Timeout {
            warn!("sftp client did not exit after `exit`, terminated it");
        }
        info!("logged out");
        Ok(())
    }

    /// Terminate the client, if any, and mark the session closed.
    pub fn close(&mut self) {
        if let Some(mut process) = self.process.take() {
            debug!("closing sftp client");
            if let Err(e) = process.close() {
                warn!("Failed to close sftp client: {}", e);
            }
        }
        self.state = SessionState::Closed;
    }

    fn process_mut(&mut self) -> Result<&mut Box<dyn Expect>> {
        self.process.as_mut().ok_or(SftpError::NotAuthenticated)
    }

    fn require_authenticated(&self) -> Result<()> {
        match self.state {
            SessionState::Authenticated => Ok(()),
            _ => Err(SftpError::NotAuthenticated),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("prompt", &self.prompt.as_str())
            .finish()
    }
}
