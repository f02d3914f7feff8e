use crate::error::{Result, SftpError};
use crate::models::{SessionSettings, MAX_TERMINAL_DIMENSION, MAX_TIMEOUT_SECS};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| Path::new(&home).join(".config/sftp-expect/settings.json"))
}

pub fn clamp_timeout_secs(value: u64) -> u64 {
    value.clamp(1, MAX_TIMEOUT_SECS)
}

pub fn clamp_dimension(value: u16) -> u16 {
    value.clamp(1, MAX_TERMINAL_DIMENSION)
}

fn clamp_settings(settings: &mut SessionSettings) {
    settings.timeout_secs = clamp_timeout_secs(settings.timeout_secs);
    settings.pty.rows = clamp_dimension(settings.pty.rows);
    settings.pty.cols = clamp_dimension(settings.pty.cols);
}

/// Write to a sibling temp file, then rename it over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data)
        .map_err(|e| SftpError::Settings(format!("Failed to write temp file: {}", e)))?;
    fs::rename(&temp_path, path).map_err(|e| {
        // Clean up temp file on rename failure
        let _ = fs::remove_file(&temp_path);
        SftpError::Settings(format!("Failed to rename temp file: {}", e))
    })
}

/// Load settings from `path`, falling back to defaults when the file does
/// not exist.
pub fn load_settings(path: &Path) -> Result<SessionSettings> {
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(SessionSettings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| SftpError::Settings(format!("Failed to read {}: {}", path.display(), e)))?;
    let mut settings: SessionSettings = serde_json::from_str(&content)
        .map_err(|e| SftpError::Settings(format!("Failed to parse {}: {}", path.display(), e)))?;
    clamp_settings(&mut settings);

    Ok(settings)
}

/// Load settings from the default location.
pub fn load_default_settings() -> Result<SessionSettings> {
    let path = config_path()
        .ok_or_else(|| SftpError::Settings("Could not determine config path".to_string()))?;
    load_settings(&path)
}

pub fn save_settings(path: &Path, settings: &SessionSettings) -> Result<()> {
    let mut settings = settings.clone();
    clamp_settings(&mut settings);

    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| SftpError::Settings(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SftpError::Settings(e.to_string()))?;
    }
    atomic_write(path, json.as_bytes())
}
