use crate::models::{LoginOptions, SessionSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The argv used to start the sftp client. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SftpCommand {
    /// Assemble the client command line for `username@server`.
    pub fn build(
        settings: &SessionSettings,
        server: &str,
        username: &str,
        options: &LoginOptions,
    ) -> Self {
        let mut args = Vec::new();

        for (name, value) in &settings.ssh_options {
            args.push("-o".to_string());
            args.push(format!("{}={}", name, value));
        }
        if options.quiet {
            args.push("-q".to_string());
        }
        if !options.check_local_ip {
            args.push("-o".to_string());
            args.push("NoHostAuthenticationForLocalhost=yes".to_string());
        }
        if settings.force_password {
            args.extend(
                [
                    "-o",
                    "RSAAuthentication=no",
                    "-o",
                    "PubkeyAuthentication=no",
                ]
                .map(String::from),
            );
        }
        if let Some(port) = options.port {
            args.push("-P".to_string());
            args.push(port.to_string());
        }
        if let Some(key) = options.ssh_key.as_ref().and_then(|key| existing_key(key)) {
            args.push("-i".to_string());
            args.push(key.to_string_lossy().to_string());
        }
        args.push(format!("{}@{}", username, server));

        Self {
            program: settings.sftp_binary.clone(),
            args,
        }
    }
}

/// Expand `~` and environment variables in a key path and keep it only if
/// it names an existing file.
fn existing_key(key: &Path) -> Option<PathBuf> {
    let raw = key.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map(|path| PathBuf::from(path.as_ref()))
        .unwrap_or_else(|_| key.to_path_buf());
    expanded.is_file().then_some(expanded)
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./@:=,+".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl fmt::Display for SftpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}
