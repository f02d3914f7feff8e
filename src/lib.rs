//! Drive an interactive `sftp` client through a pseudo-terminal.
//!
//! A [`Session`] spawns the client, walks it through the login handshake
//! and then sends one command at a time, waiting for the client's prompt
//! and recognising the error messages it prints on the way.
//!
//! ```no_run
//! use sftp_expect::{LoginOptions, Session, SessionSettings};
//!
//! # fn main() -> sftp_expect::Result<()> {
//! let mut session = Session::new(SessionSettings::default())?;
//! session.login("example.com", "alice", "secret", &LoginOptions::default())?;
//! session.cd("/upload")?;
//! session.put("report.csv", "report.csv", "p")?;
//! println!("now in {}", session.pwd()?);
//! session.logout()?;
//! # Ok(())
//! # }
//! ```
//!
//! With the `test-support` feature, `expect::ScriptedSpawner` replays a
//! canned conversation so a `Session` can be exercised without a server.
pub mod error;
pub mod expect;
pub mod models;
pub mod options;
pub mod output;
pub mod session;
pub mod settings;
pub mod taxonomy;
pub mod utils;

// Re-export the types most callers need
pub use error::{InteractionError, LoginFailure, Result, SftpError};
pub use models::{LoginOptions, PtyDimensions, SessionSettings, SessionState};
pub use output::DiskUsage;
pub use session::{CommandOutput, Session, SftpCommand};
pub use taxonomy::ErrorKind;

#[cfg(test)]
mod tests;
