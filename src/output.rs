use crate::error::{Result, SftpError};

pub const REMOTE_PWD_PREFIX: &str = "Remote working directory: ";
pub const LOCAL_PWD_PREFIX: &str = "Local working directory: ";

/// Strip everything up to and including `prefix`, then surrounding
/// whitespace.
///
/// Fails with [`SftpError::ResultInvalid`] when `prefix` does not occur in
/// `raw`: the client printed something this crate does not understand.
pub fn extract(raw: &str, prefix: &str) -> Result<String> {
    let index = raw.find(prefix).ok_or(SftpError::ResultInvalid)?;
    Ok(raw[index + prefix.len()..].trim().to_string())
}

/// Split a directory listing into entries.
///
/// Long and single-column listings are split per line so that each entry
/// keeps its columns; short listings are split on whitespace.
pub fn split_entries(text: &str, per_line: bool) -> Vec<String> {
    if per_line {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Output of `df`: the header row and the first value row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub headers: Vec<String>,
    pub values: Vec<String>,
}

pub fn parse_df(text: &str) -> Option<DiskUsage> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let headers = lines.next()?.split_whitespace().map(str::to_string).collect();
    let values = lines.next()?.split_whitespace().map(str::to_string).collect();
    Some(DiskUsage { headers, values })
}
