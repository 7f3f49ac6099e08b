//! Opening bookmark URLs outside the shell.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Capability to open a URL in a browser.
pub trait UrlOpener: Send + Sync {
    /// Returns whether the URL was handed off.
    fn open(&self, url: &str) -> bool;
}

/// Prefix `https://` unless the URL already names an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Opens URLs by spawning an external program such as `xdg-open`.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    program: String,
}

impl CommandOpener {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The usual opener for the host platform
    pub fn platform_default() -> Self {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        Self::new(program)
    }
}

impl UrlOpener for CommandOpener {
    fn open(&self, url: &str) -> bool {
        let spawned = Command::new(&self.program)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(_) => {
                debug!(program = %self.program, url, "opened url");
                true
            }
            Err(e) => {
                warn!(program = %self.program, url, error = %e, "failed to launch opener");
                false
            }
        }
    }
}
