// Error taxonomy for the build pipeline.
// Fetch failures abort a pass without touching disk, corrupt state is never papered over.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network, auth or HTTP status failure reported by the league source
    #[error("fetch failed for {what}: {message}")]
    Fetch { what: String, message: String },

    /// Cache or artifact data that exists but cannot be used
    #[error("corrupt state in {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn fetch(what: impl Into<String>, message: impl ToString) -> Self {
        PipelineError::Fetch {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PipelineError::Corrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures the invoker can fix by simply re-running
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::Fetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_is_transient() {
        let err = PipelineError::fetch("week 3", "connection reset");
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "fetch failed for week 3: connection reset");

        let err = PipelineError::corrupt("cache/2024/week_3.json", "expected 2 teams");
        assert!(!err.is_transient());
        assert!(err.to_string().contains("week_3.json"));
    }
}
