use crate::analyzer_core::store_backend::StoreError;
use std::path::PathBuf;

/// Failures that end a run.
#[derive(Debug)]
pub enum AnalyzerError {
    InputNotFound(PathBuf),
    Io(std::io::Error),
    Store(StoreError),
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::Io(err)
    }
}

impl From<StoreError> for AnalyzerError {
    fn from(err: StoreError) -> Self {
        AnalyzerError::Store(err)
    }
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerError::InputNotFound(path) => {
                write!(f, "The file '{}' does not exist.", path.display())
            }
            AnalyzerError::Io(e) => write!(f, "IO error: {}", e),
            AnalyzerError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzerError::InputNotFound(_) => None,
            AnalyzerError::Io(e) => Some(e),
            AnalyzerError::Store(e) => Some(e),
        }
    }
}
