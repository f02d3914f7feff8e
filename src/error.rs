use crate::taxonomy::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SftpError>;

/// Why a login handshake was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginFailure {
    #[error("permission denied")]
    PermissionDenied,
    #[error("password refused")]
    PasswordRefused,
    #[error("connection closed")]
    ConnectionClosed,
    #[error("could not establish connection to host")]
    ConnectionFailed,
    #[error("got \"are you sure\" prompt twice")]
    RepeatedHostKeyPrompt,
    #[error("got \"terminal type\" prompt twice")]
    RepeatedTerminalTypePrompt,
    #[error("timed out waiting for the sftp prompt")]
    Timeout,
}

/// A failure the sftp client reported in its own output.
///
/// Carries the kind and the pattern that recognised it. The session that
/// produced it is still sitting at a prompt and can be reused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", kind.message())]
pub struct InteractionError {
    pub kind: ErrorKind,
    pub pattern: &'static str,
}

impl InteractionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            pattern: kind.pattern(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SftpError {
    #[error("login failed: {0}")]
    Login(LoginFailure),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error("result invalid")]
    ResultInvalid,

    #[error("timed out waiting for the sftp prompt after `{command}`")]
    CommandTimeout { command: String },

    #[error("sftp process ended unexpectedly")]
    StreamEnded,

    #[error("session is not logged in")]
    NotAuthenticated,

    #[error("session is already logged in")]
    AlreadyConnected,

    #[error("failed to spawn sftp: {0}")]
    Spawn(String),

    #[error("pty I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl SftpError {
    /// True for errors recognised in the client's output. The session
    /// remains usable after these.
    pub fn is_interactive(&self) -> bool {
        matches!(self, SftpError::Interaction(_))
    }

    /// True for errors detected locally. The session should be considered
    /// closed after these.
    pub fn is_local(&self) -> bool {
        !self.is_interactive()
    }

    /// The classified kind, if this error came from the client's output.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SftpError::Interaction(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl From<LoginFailure> for SftpError {
    fn from(failure: LoginFailure) -> Self {
        SftpError::Login(failure)
    }
}
