use super::{Session, SftpCommand};
use crate::error::{LoginFailure, Result, SftpError};
use crate::expect::{Expect, Outcome, Pattern};
use crate::models::{LoginOptions, SessionState};
use std::time::Duration;
use tracing::{debug, info, warn};

const HOST_KEY_PROMPT: &str = "(?i)are you sure you want to continue connecting";
const PASSWORD_PROMPT: &str = "(?i)(?:password)|(?:passphrase for key)";
const PERMISSION_DENIED: &str = "(?i)permission denied";
const TERMINAL_TYPE_PROMPT: &str = "(?i)terminal type";
const CONNECTION_CLOSED: &str = "(?i)connection closed by remote host";

/// What the client printed during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    HostKey,
    Ready,
    Password,
    PermissionDenied,
    TerminalType,
    ConnectionClosed,
    Timeout,
    Eof,
}

struct HandshakePatterns {
    host_key: Pattern,
    password: Pattern,
    permission_denied: Pattern,
    terminal_type: Pattern,
    connection_closed: Pattern,
}

impl HandshakePatterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            host_key: Pattern::regex(HOST_KEY_PROMPT)?,
            password: Pattern::regex(PASSWORD_PROMPT)?,
            permission_denied: Pattern::regex(PERMISSION_DENIED)?,
            terminal_type: Pattern::regex(TERMINAL_TYPE_PROMPT)?,
            connection_closed: Pattern::regex(CONNECTION_CLOSED)?,
        })
    }
}

impl Session {
    /// Start the client and log in to `server` as `username`.
    ///
    /// `password` may be empty when key based authentication is expected;
    /// it is only sent if the client asks for one. On success the client
    /// is believed to be sitting at its prompt. On failure the client is
    /// terminated and the session is closed.
    pub fn login(
        &mut self,
        server: &str,
        username: &str,
        password: &str,
        options: &LoginOptions,
    ) -> Result<()> {
        if self.state == SessionState::Authenticated {
            return Err(SftpError::AlreadyConnected);
        }

        self.span.record("remote", format!("{}@{}", username, server).as_str());
        let _enter = self.span.clone().entered();

        let command = SftpCommand::build(&self.settings, server, username, options);
        let process = self.spawner.spawn(&command)?;
        self.process = Some(process);
        self.state = SessionState::Unauthenticated;

        match self.handshake(password, options) {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                info!("logged in");
                Ok(())
            }
            Err(e) => {
                warn!("login failed: {}", e);
                self.close();
                Err(e)
            }
        }
    }

    fn handshake(&mut self, password: &str, options: &LoginOptions) -> Result<()> {
        let patterns = HandshakePatterns::compile()?;
        let prompt = self.prompt.clone();
        let timeout = options.login_timeout();
        let strict = self.settings.strict_login;
        let process = self.process_mut()?;

        // Phase 1: whatever the client opens with
        let mut seen = first_phase(&mut **process, &patterns, &prompt, timeout)?;
        if seen == Prompt::HostKey {
            debug!("accepting unknown host key");
            process.send_line("yes")?;
            seen = first_phase(&mut **process, &patterns, &prompt, timeout)?;
        }

        match seen {
            Prompt::Ready => return Ok(()),
            Prompt::Timeout => return timeout_outcome(strict),
            Prompt::HostKey => return Err(LoginFailure::RepeatedHostKeyPrompt.into()),
            Prompt::PermissionDenied => return Err(LoginFailure::PermissionDenied.into()),
            Prompt::ConnectionClosed => return Err(LoginFailure::ConnectionClosed.into()),
            Prompt::Eof => return Err(LoginFailure::ConnectionFailed.into()),
            Prompt::Password => {
                debug!("sending <password>");
                process.send_line(password)?;
            }
            Prompt::TerminalType => {
                debug!(terminal_type = %options.terminal_type, "sending terminal type");
                process.send_line(&options.terminal_type)?;
            }
        }

        // Phase 2: only the prompt (or silence) means success. Any further
        // question means the answer was not accepted.
        match second_phase(&mut **process, &patterns, &prompt, timeout)? {
            Prompt::Ready => Ok(()),
            Prompt::Timeout => timeout_outcome(strict),
            Prompt::HostKey => Err(LoginFailure::RepeatedHostKeyPrompt.into()),
            Prompt::Password => Err(LoginFailure::PasswordRefused.into()),
            Prompt::TerminalType => Err(LoginFailure::RepeatedTerminalTypePrompt.into()),
            Prompt::PermissionDenied => Err(LoginFailure::PermissionDenied.into()),
            Prompt::ConnectionClosed | Prompt::Eof => Err(LoginFailure::ConnectionFailed.into()),
        }
    }
}

/// A login wait that found no prompt. The ready pattern is best effort, so
/// by default silence is taken to mean the client is waiting for input.
fn timeout_outcome(strict: bool) -> Result<()> {
    if strict {
        Err(LoginFailure::Timeout.into())
    } else {
        warn!("no prompt seen before the login timeout, assuming logged in");
        Ok(())
    }
}

fn first_phase(
    process: &mut dyn Expect,
    patterns: &HandshakePatterns,
    prompt: &Pattern,
    timeout: Duration,
) -> Result<Prompt> {
    let list = [
        &patterns.host_key,
        prompt,
        &patterns.password,
        &patterns.permission_denied,
        &patterns.terminal_type,
        &patterns.connection_closed,
    ];
    let seen = match process.expect(&list, timeout)? {
        Outcome::Matched(m) => match m.index {
            0 => Prompt::HostKey,
            1 => Prompt::Ready,
            2 => Prompt::Password,
            3 => Prompt::PermissionDenied,
            4 => Prompt::TerminalType,
            _ => Prompt::ConnectionClosed,
        },
        Outcome::Timeout => Prompt::Timeout,
        Outcome::Eof(_) => Prompt::Eof,
    };
    debug!(?seen, "login phase 1");
    Ok(seen)
}

fn second_phase(
    process: &mut dyn Expect,
    patterns: &HandshakePatterns,
    prompt: &Pattern,
    timeout: Duration,
) -> Result<Prompt> {
    let list = [
        &patterns.host_key,
        prompt,
        &patterns.password,
        &patterns.permission_denied,
        &patterns.terminal_type,
    ];
    let seen = match process.expect(&list, timeout)? {
        Outcome::Matched(m) => match m.index {
            0 => Prompt::HostKey,
            1 => Prompt::Ready,
            2 => Prompt::Password,
            3 => Prompt::PermissionDenied,
            _ => Prompt::TerminalType,
        },
        Outcome::Timeout => Prompt::Timeout,
        Outcome::Eof(_) => Prompt::Eof,
    };
    debug!(?seen, "login phase 2");
    Ok(seen)
}
