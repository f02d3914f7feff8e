// Error conditions the sftp client reports in its output, and how to spot them.
use crate::error::{Result, SftpError};
use crate::expect::Pattern;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    NoSuchFile,
    FileNotFound,
    NonRegularFile,
    NotADirectory,
    FileExists,
    CouldNotLink,
    CreateDirectoryFailure,
    DeleteFailure,
    RemoveDirectoryFailure,
    LsNotFound,
    InvalidOption,
    LumaskNotNumeric,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::PermissionDenied,
        ErrorKind::NoSuchFile,
        ErrorKind::FileNotFound,
        ErrorKind::NonRegularFile,
        ErrorKind::NotADirectory,
        ErrorKind::FileExists,
        ErrorKind::CouldNotLink,
        ErrorKind::CreateDirectoryFailure,
        ErrorKind::DeleteFailure,
        ErrorKind::RemoveDirectoryFailure,
        ErrorKind::LsNotFound,
        ErrorKind::InvalidOption,
        ErrorKind::LumaskNotNumeric,
    ];

    /// Human readable label.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "Permission denied",
            ErrorKind::NoSuchFile => "No such file or directory",
            ErrorKind::FileNotFound => "File not found",
            ErrorKind::NonRegularFile => "Cannot download non-regular file",
            ErrorKind::NotADirectory => "Not a directory",
            ErrorKind::FileExists => "File exists",
            ErrorKind::CouldNotLink => "Couldn't link file",
            ErrorKind::CreateDirectoryFailure => "Couldn't create directory: Failure",
            ErrorKind::DeleteFailure => "Couldn't delete file: Failure",
            ErrorKind::RemoveDirectoryFailure => "Couldn't remove directory: Failure",
            ErrorKind::LsNotFound => "Can't ls: not found",
            ErrorKind::InvalidOption => "ls: invalid option",
            ErrorKind::LumaskNotNumeric => {
                "You must supply a numeric argument to the lumask command."
            }
        }
    }

    /// Regular expression that detects this condition in client output.
    pub fn pattern(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "(?i)permission denied",
            ErrorKind::NoSuchFile => "Couldn't stat remote file: No such file or directory",
            ErrorKind::FileNotFound => r"File .* not found\.",
            ErrorKind::NonRegularFile => "Cannot download non-regular file",
            ErrorKind::NotADirectory => "Not a directory",
            ErrorKind::FileExists => "File exists",
            ErrorKind::CouldNotLink => "Couldn't link file",
            ErrorKind::CreateDirectoryFailure => "Couldn't create directory: Failure",
            ErrorKind::DeleteFailure => "Couldn't delete file: Failure",
            ErrorKind::RemoveDirectoryFailure => "Couldn't remove directory: Failure",
            ErrorKind::LsNotFound => "Can't ls:.* not found",
            ErrorKind::InvalidOption => "ls: invalid option",
            ErrorKind::LumaskNotNumeric => {
                r"You must supply a numeric argument to the lumask command\."
            }
        }
    }

    /// The compiled detection pattern, shared by every session.
    pub fn compiled(self) -> Result<&'static Pattern> {
        let table = compiled_table().map_err(|e| SftpError::InvalidPattern(e.clone()))?;
        // ALL lists the variants in declaration order
        Ok(&table[self as usize])
    }
}

fn compiled_table() -> std::result::Result<&'static [Pattern], &'static regex::Error> {
    static TABLE: OnceLock<std::result::Result<Vec<Pattern>, regex::Error>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            ErrorKind::ALL
                .iter()
                .map(|kind| Pattern::try_from(kind.pattern()))
                .collect()
        })
        .as_deref()
}
