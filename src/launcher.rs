//! Opening story links outside the terminal.
use crate::util::{validate_url_for_open, UrlValidationError};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Url(#[from] UrlValidationError),

    #[error("Browser command is empty")]
    EmptyCommand,

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Hands a link to something that can show it.
pub trait Launcher {
    fn goto(&mut self, link: &str) -> Result<(), LaunchError>;
}

/// Opens links with the configured browser command, or the platform's
/// default opener when none is configured.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    browser: Option<String>,
}

impl SystemLauncher {
    pub fn new(browser: Option<String>) -> Self {
        Self {
            browser: browser.filter(|b| !b.trim().is_empty()),
        }
    }
}

impl Launcher for SystemLauncher {
    fn goto(&mut self, link: &str) -> Result<(), LaunchError> {
        let url = validate_url_for_open(link)?;
        tracing::info!(url = %url, browser = ?self.browser, "Opening link");

        match &self.browser {
            Some(command) => spawn_detached(&browser_argv(command, url.as_str())?),
            None => open::that_detached(url.as_str()).map_err(|source| LaunchError::Spawn {
                program: "system opener".to_string(),
                source,
            }),
        }
    }
}

/// Split a browser command into argv. `%u` marks where the link goes;
/// without it the link is the last argument.
fn browser_argv(command: &str, url: &str) -> Result<Vec<String>, LaunchError> {
    let mut argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(LaunchError::EmptyCommand);
    }
    if argv.iter().any(|a| a.contains("%u")) {
        for arg in &mut argv {
            *arg = arg.replace("%u", url);
        }
    } else {
        argv.push(url.to_string());
    }
    Ok(argv)
}

fn spawn_detached(argv: &[String]) -> Result<(), LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Reap the child on exit.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}
