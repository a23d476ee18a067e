use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the folding engine and its configuration loader.
///
/// "Nothing to fold" is not an error; commands report it as
/// [`CommandResult::NoTargetFound`](crate::CommandResult::NoTargetFound).
pub enum FoldError {
    #[error("tab width must be at least 1, got {0}")]
    /// A tab width of zero was configured.
    InvalidTabWidth(usize),

    #[error("line {line} is out of range (document has {line_count} lines)")]
    /// A line could not be read from the buffer.
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Line count reported by the buffer.
        line_count: usize,
    },

    #[error("invalid line range: {start}..{end}")]
    /// An explicit range ends before it starts.
    InvalidRange {
        /// First line of the range.
        start: usize,
        /// One past the last line of the range.
        end: usize,
    },

    #[error("unknown fold command '{0}'")]
    /// A command name did not match any [`FoldCommandKind`](crate::FoldCommandKind).
    UnknownCommand(String),

    #[error("config parse error: {0}")]
    /// Configuration JSON could not be parsed.
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Reading a configuration file failed.
    Io(#[from] std::io::Error),
}
