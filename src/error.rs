use std::path::PathBuf;

use thiserror::Error;

pub type TsResult<T> = Result<T, TsError>;

#[derive(Debug, Error)]
pub enum TsError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tag failure: {0}")]
    Tag(#[from] id3::Error),

    #[error("missing command `{command}` on PATH")]
    CommandMissing { command: String },

    #[error("command failed: `{command}` (status: {status}){stderr_suffix}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("command timed out after {timeout_ms}ms: `{command}`{stderr_suffix}")]
    CommandTimedOut {
        command: String,
        timeout_ms: u64,
        stderr_suffix: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing expected artifact at `{0}`")]
    MissingArtifact(PathBuf),
}

impl TsError {
    #[must_use]
    pub fn from_command_failure(command: String, status: i32, stderr: String) -> Self {
        Self::CommandFailed {
            command,
            status,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    #[must_use]
    pub fn from_command_timeout(command: String, timeout_ms: u64, stderr: String) -> Self {
        Self::CommandTimedOut {
            command,
            timeout_ms,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    /// Stable, unique, machine-readable code for every variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "TS-IO",
            Self::Json(_) => "TS-JSON",
            Self::Tag(_) => "TS-TAG",
            Self::CommandMissing { .. } => "TS-CMD-MISSING",
            Self::CommandFailed { .. } => "TS-CMD-FAILED",
            Self::CommandTimedOut { .. } => "TS-CMD-TIMEOUT",
            Self::InvalidRequest(_) => "TS-INVALID-REQUEST",
            Self::MissingArtifact(_) => "TS-MISSING-ARTIFACT",
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("; stderr: {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::TsError;

    fn all_variants() -> Vec<TsError> {
        vec![
            TsError::Io(std::io::Error::other("disk fail")),
            TsError::Json(serde_json::from_str::<serde_json::Value>("{").unwrap_err()),
            TsError::Tag(id3::Error::new(id3::ErrorKind::NoTag, "no tag")),
            TsError::CommandMissing {
                command: "yt-dlp".to_owned(),
            },
            TsError::CommandFailed {
                command: "cmd".to_owned(),
                status: 1,
                stderr_suffix: String::new(),
            },
            TsError::CommandTimedOut {
                command: "slow".to_owned(),
                timeout_ms: 5000,
                stderr_suffix: String::new(),
            },
            TsError::InvalidRequest("bad".to_owned()),
            TsError::MissingArtifact(std::path::PathBuf::from("out.mp3")),
        ]
    }

    #[test]
    fn from_command_failure_with_empty_stderr() {
        let err = TsError::from_command_failure("cmd".to_owned(), 1, String::new());
        let text = err.to_string();
        assert!(text.contains("cmd"));
        assert!(text.contains("status: 1"));
        assert!(!text.contains("stderr"));
    }

    #[test]
    fn from_command_failure_with_nonempty_stderr() {
        let err = TsError::from_command_failure("prog arg".to_owned(), 2, "  oh no  \n".to_owned());
        let text = err.to_string();
        assert!(text.contains("prog arg"));
        assert!(text.contains("status: 2"));
        assert!(text.contains("stderr: oh no"), "should trim stderr: {text}");
    }

    #[test]
    fn from_command_timeout_whitespace_only_stderr_treated_as_empty() {
        let err = TsError::from_command_timeout("slow".to_owned(), 5000, "   \n\t  ".to_owned());
        let text = err.to_string();
        assert!(text.contains("5000ms"));
        assert!(!text.contains("stderr"), "whitespace-only stderr omitted: {text}");
    }

    #[test]
    fn display_messages_for_all_variants() {
        let expected = [
            "i/o failure",
            "json failure",
            "tag failure",
            "missing command",
            "command failed",
            "command timed out",
            "invalid request",
            "missing expected artifact",
        ];
        let variants = all_variants();
        assert_eq!(variants.len(), expected.len());
        for (error, substring) in variants.iter().zip(expected) {
            let text = error.to_string();
            assert!(text.contains(substring), "expected `{substring}` in: {text}");
        }
    }

    #[test]
    fn error_codes_are_unique_and_prefixed() {
        let mut seen = std::collections::HashSet::new();
        for error in all_variants() {
            let code = error.error_code();
            assert!(code.starts_with("TS-"), "bad prefix: {code}");
            assert!(seen.insert(code), "duplicate error_code: {code}");
        }
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ts_err: TsError = io_err.into();
        assert!(matches!(ts_err, TsError::Io(_)));
        assert!(ts_err.to_string().contains("file not found"));
    }

    #[test]
    fn missing_artifact_displays_unicode_path() {
        let err = TsError::MissingArtifact(std::path::PathBuf::from("/tmp/données/résultat.mp3"));
        let text = err.to_string();
        assert!(text.contains("résultat.mp3"), "unicode path preserved: {text}");
    }

    #[test]
    fn ts_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<TsError>();
        assert_sync::<TsError>();
    }
}
