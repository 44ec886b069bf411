//! Clipboard delivery as an ordered list of strategies.
//!
//! The chain tries each strategy in turn and stops at the first that
//! succeeds. The default chain asks the system clipboard first and falls
//! back to piping the text through a platform copy tool from a transient
//! staging file.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("{strategy} failed: {reason}")]
    WriteFailed { strategy: String, reason: String },

    #[error("every clipboard strategy failed ({})", .0.join("; "))]
    Exhausted(Vec<String>),
}

pub trait ClipboardStrategy {
    fn name(&self) -> &'static str;
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard, through `arboard`.
///
/// The connection is opened on first use and kept: on X11 and Wayland the
/// copied text is only served while its owning `arboard::Clipboard` lives.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn is_connected(&self) -> bool {
        self.clipboard.is_some()
    }
}

impl ClipboardStrategy for SystemClipboard {
    fn name(&self) -> &'static str {
        "system clipboard"
    }

    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let name = self.name();
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(format!("{} ({})", name, e)))?;
            self.clipboard = Some(clipboard);
        }
        let clipboard = self
            .clipboard
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable(name.to_string()))?;

        let written = clipboard.set_text(text).map_err(|e| ClipboardError::WriteFailed {
            strategy: name.to_string(),
            reason: e.to_string(),
        });
        if written.is_err() {
            // Reconnect on the next attempt
            self.clipboard = None;
        }
        written
    }
}

/// Fallback: stage the text in a temporary file, feed it to a copy tool,
/// and delete the file again whether or not the tool succeeded.
pub struct TransientFileClipboard {
    program: String,
    args: Vec<String>,
    last_surface: Option<PathBuf>,
}

impl TransientFileClipboard {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            last_surface: None,
        }
    }

    /// Picks the copy tool for the running platform.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("pbcopy", &[])
        } else if cfg!(target_os = "windows") {
            Self::new("clip", &[])
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::new("wl-copy", &[])
        } else {
            Self::new("xclip", &["-selection", "clipboard"])
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Path of the staging file used by the last copy. It no longer exists
    /// once `copy` has returned.
    pub fn last_surface(&self) -> Option<&PathBuf> {
        self.last_surface.as_ref()
    }

    fn pipe_through_tool(&self, surface: &tempfile::NamedTempFile) -> Result<(), String> {
        let staged = surface.reopen().map_err(|e| e.to_string())?;
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(staged))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| e.to_string())?;

        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {}", self.program, status))
        }
    }
}

impl ClipboardStrategy for TransientFileClipboard {
    fn name(&self) -> &'static str {
        "copy tool"
    }

    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let strategy = format!("{} ({})", self.name(), self.program);
        let failed = |reason: String| ClipboardError::WriteFailed {
            strategy: strategy.clone(),
            reason,
        };

        let mut surface = tempfile::Builder::new()
            .prefix("phishlens-clip-")
            .tempfile()
            .map_err(|e| failed(e.to_string()))?;
        self.last_surface = Some(surface.path().to_path_buf());

        let outcome = surface
            .write_all(text.as_bytes())
            .and_then(|_| surface.flush())
            .map_err(|e| e.to_string())
            .and_then(|_| self.pipe_through_tool(&surface));

        if let Err(e) = surface.close() {
            warn!("Could not remove clipboard staging file: {}", e);
        }

        outcome.map_err(failed)
    }
}

pub struct ClipboardChain {
    strategies: Vec<Box<dyn ClipboardStrategy>>,
}

impl fmt::Debug for ClipboardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl Default for ClipboardChain {
    /// For long-running sessions: the system clipboard stays owned for as
    /// long as the chain lives.
    fn default() -> Self {
        Self::new(vec![
            Box::new(SystemClipboard::default()),
            Box::new(TransientFileClipboard::detect()),
        ])
    }
}

impl ClipboardChain {
    pub fn new(strategies: Vec<Box<dyn ClipboardStrategy>>) -> Self {
        Self { strategies }
    }

    /// For a process that exits right after copying. X11 and Wayland drop
    /// a selection together with its owner, so there the copy tool goes
    /// first: `xclip` and `wl-copy` keep serving the text after we exit.
    pub fn one_shot() -> Self {
        if cfg!(all(unix, not(target_os = "macos"))) {
            Self::new(vec![
                Box::new(TransientFileClipboard::detect()),
                Box::new(SystemClipboard::default()),
            ])
        } else {
            Self::default()
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Returns the name of the strategy that took the text.
    pub fn copy(&mut self, text: &str) -> Result<&'static str, ClipboardError> {
        let mut failures = Vec::new();
        for strategy in self.strategies.iter_mut() {
            match strategy.copy(text) {
                Ok(()) => return Ok(strategy.name()),
                Err(e) => {
                    debug!("{} failed, trying next strategy: {}", strategy.name(), e);
                    failures.push(e.to_string());
                }
            }
        }
        Err(ClipboardError::Exhausted(failures))
    }
}
