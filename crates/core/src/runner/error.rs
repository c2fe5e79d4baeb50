//! Error types for the process runner.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while starting a process.
///
/// Once a process is running, failures are reported through its
/// `ExitOutcome` rather than through this type.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The executable does not exist.
    #[error("executable not found: {path}")]
    NotFound { path: PathBuf },

    /// The OS refused to create the process.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipe that should have been captured was missing.
    #[error("{stream} of {program} was not captured")]
    MissingPipe {
        program: String,
        stream: &'static str,
    },
}

impl RunnerError {
    /// Maps a spawn `io::Error` to the matching runner error.
    pub fn from_spawn(program: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: program.to_path_buf(),
            }
        } else {
            Self::Spawn {
                program: program.display().to_string(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_not_found_is_mapped() {
        let err = RunnerError::from_spawn(
            Path::new("/missing/yt-dlp"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, RunnerError::NotFound { .. }));
        assert_eq!(err.to_string(), "executable not found: /missing/yt-dlp");
    }

    #[test]
    fn test_other_errors_are_spawn_failures() {
        let err = RunnerError::from_spawn(
            Path::new("/bin/yt-dlp"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, RunnerError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to spawn /bin/yt-dlp"));
    }
}
