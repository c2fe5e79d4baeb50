//! Types for the process runner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::handle::ProcessHandle;

/// Which pipe a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// One line of process output, tagged with its origin stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: StreamKind,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stderr,
            text: text.into(),
        }
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitOutcome {
    /// Exit code, absent when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
    /// Whether termination was requested through `ProcessHandle::kill`.
    pub killed: bool,
}

impl ExitOutcome {
    /// Builds an outcome from a plain exit code.
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
            killed: false,
        }
    }

    /// Outcome of a process that was terminated on request.
    pub fn killed() -> Self {
        Self {
            code: None,
            success: false,
            killed: true,
        }
    }

    /// Outcome used when the exit status could not be observed.
    pub fn unknown() -> Self {
        Self {
            code: None,
            success: false,
            killed: false,
        }
    }

    pub(crate) fn from_status(
        status: std::io::Result<std::process::ExitStatus>,
        killed: bool,
    ) -> Self {
        match status {
            Ok(status) => Self {
                code: status.code(),
                success: status.success(),
                killed,
            },
            Err(_) => Self {
                killed,
                ..Self::unknown()
            },
        }
    }
}

/// Description of a process to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Program name without its directory, for log lines.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// A spawned process: its merged output lines and its control handle.
///
/// The line channel closes once both pipes reach end-of-file.
#[derive(Debug)]
pub struct RunningProcess {
    pub lines: mpsc::Receiver<OutputLine>,
    pub handle: ProcessHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("/opt/bin/yt-dlp")
            .with_args(["--newline", "--progress"])
            .with_working_dir("/tmp");

        assert_eq!(spec.args, vec!["--newline", "--progress"]);
        assert_eq!(spec.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(spec.program_name(), "yt-dlp");
    }

    #[test]
    fn test_exit_outcome_from_code() {
        assert!(ExitOutcome::from_code(0).success);
        let failed = ExitOutcome::from_code(1);
        assert!(!failed.success);
        assert_eq!(failed.code, Some(1));
        assert!(!failed.killed);
    }

    #[test]
    fn test_stream_kind_display() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(OutputLine::stderr("x").stream, StreamKind::Stderr);
    }
}
