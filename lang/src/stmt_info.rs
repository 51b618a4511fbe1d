use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Location of a construct in a `.tm` source: the line range and column
/// range of its defining occurrence, plus the file it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StmtInfo {
    line_range: (usize, usize),
    column_range: (usize, usize),
    source: Arc<PathBuf>,
}

impl StmtInfo {
    pub fn new(
        line_range: (usize, usize),
        column_range: (usize, usize),
        source: Arc<PathBuf>,
    ) -> Self {
        Self {
            line_range,
            column_range,
            source,
        }
    }

    pub fn line_range(&self) -> (usize, usize) {
        self.line_range
    }

    pub fn column_range(&self) -> (usize, usize) {
        self.column_range
    }

    pub fn start_line(&self) -> usize {
        self.line_range.0
    }

    pub fn start_column(&self) -> usize {
        self.column_range.0
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl fmt::Display for StmtInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source.display(),
            self.line_range.0,
            self.column_range.0
        )
    }
}
