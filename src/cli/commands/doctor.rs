//! Doctor command - verify external tools, backend and configuration.

use crate::cli::{preflight, Output};
use crate::config::{ProviderMode, Settings};
use console::style;
use std::path::PathBuf;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("yt-transcript Doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    checks.push(check_config_file(config_path));
    checks.push(CheckResult::ok("Provider", &settings.provider.mode.to_string()));
    for check in &checks {
        check.print();
    }
    println!();

    let provider_check = match settings.provider.mode {
        ProviderMode::Local => {
            println!("{}", style("External Tools").bold());
            check_ytdlp()
        }
        ProviderMode::Remote => {
            println!("{}", style("Backend").bold());
            check_backend(&settings.provider.backend_url).await
        }
    };
    provider_check.print();
    checks.push(provider_check);
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! yt-transcript is ready to use.");
    }

    Ok(())
}

fn check_ytdlp() -> CheckResult {
    match preflight::check_tool("yt-dlp") {
        Ok(version) => CheckResult::ok("yt-dlp", &version),
        Err(e) => CheckResult::error("yt-dlp", &e.to_string(), install_hint_ytdlp()),
    }
}

async fn check_backend(base_url: &str) -> CheckResult {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
        Ok(client) => client,
        Err(e) => return CheckResult::error("Backend", &e.to_string(), "Check your TLS setup"),
    };

    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => CheckResult::ok("Backend", &url),
        Ok(response) => CheckResult::warning(
            "Backend",
            &format!("{} returned {}", url, response.status()),
            "The backend is reachable but unhealthy",
        ),
        Err(e) => CheckResult::error(
            "Backend",
            &format!("{} unreachable: {}", url, e),
            "Set YT_MCP_BACKEND_URL or provider.backend_url",
        ),
    }
}

fn check_config_file(config_path: Option<&PathBuf>) -> CheckResult {
    let path = config_path.cloned().unwrap_or_else(Settings::default_config_path);
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", path.display()),
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
