//! Pre-flight checks before fetching transcripts.
//!
//! Fails fast when the configured provider cannot possibly work, instead of
//! surfacing the problem as a per-video error later.

use crate::config::{ProviderMode, Settings};
use crate::error::{Result, TranscriptError};
use std::process::Command;

/// Run pre-flight checks for the configured provider.
pub fn check(settings: &Settings) -> Result<()> {
    match settings.provider.mode {
        ProviderMode::Local => check_tool("yt-dlp").map(|_| ()),
        // Reachability is only known after the first request.
        ProviderMode::Remote => Ok(()),
    }
}

/// Check that an external tool runs, returning the first line of its version output.
pub fn check_tool(name: &str) -> Result<String> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("installed")
            .trim()
            .to_string()),
        Ok(_) => Err(TranscriptError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TranscriptError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TranscriptError::ToolFailed(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_mode_has_no_requirements() {
        let mut settings = Settings::default();
        settings.provider.mode = ProviderMode::Remote;
        assert!(check(&settings).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        let err = check_tool("definitely-not-a-real-tool-xyz").unwrap_err();
        assert!(matches!(err, TranscriptError::ToolNotFound(name) if name == "definitely-not-a-real-tool-xyz"));
    }
}
