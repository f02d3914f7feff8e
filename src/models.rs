use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

// PTY and buffering constants
pub const PTY_BUFFER_SIZE: usize = 8192; // 8KB for PTY read buffer
pub const MAX_OUTPUT_BUFFER_SIZE: usize = 1024 * 1024; // 1MB of unmatched output kept
pub const MAX_TERMINAL_DIMENSION: u16 = 10000;

// Timeout constants
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 3600;

pub const DEFAULT_PROMPT: &str = "sftp> ";
pub const DEFAULT_SFTP_BINARY: &str = "sftp";
pub const DEFAULT_TERMINAL_TYPE: &str = "ansi";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtyDimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Default for PtyDimensions {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

/// Construction-time configuration of a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Default wait for any single pattern match, in seconds.
    pub timeout_secs: u64,
    /// Regular expression for the client's ready prompt.
    pub prompt: String,
    /// Passed to the client as `-o key=value`.
    pub ssh_options: BTreeMap<String, String>,
    /// Turn off public key authentication.
    pub force_password: bool,
    /// Treat a login timeout as a failure instead of assuming success.
    pub strict_login: bool,
    pub sftp_binary: String,
    pub pty: PtyDimensions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompt: DEFAULT_PROMPT.to_string(),
            ssh_options: BTreeMap::new(),
            force_password: false,
            strict_login: false,
            sftp_binary: DEFAULT_SFTP_BINARY.to_string(),
            pty: PtyDimensions::default(),
        }
    }
}

impl SessionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_ssh_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.ssh_options.insert(name.into(), value.into());
        self
    }
}

/// Per-login overrides.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoginOptions {
    /// Sent if the client asks for a terminal type.
    pub terminal_type: String,
    pub login_timeout_secs: u64,
    pub port: Option<u16>,
    /// Private key; ignored unless it names an existing file. `~` is expanded.
    pub ssh_key: Option<PathBuf>,
    /// Pass `-q` to the client.
    pub quiet: bool,
    /// When false, skip host key checks for localhost.
    pub check_local_ip: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            terminal_type: DEFAULT_TERMINAL_TYPE.to_string(),
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            port: None,
            ssh_key: None,
            quiet: true,
            check_local_ip: true,
        }
    }
}

impl LoginOptions {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}
