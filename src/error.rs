use thiserror::Error;

/// Why a line (or the region set as a whole) failed to parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorReason {
    #[error("line does not match the maps grammar")]
    MalformedLine,
    #[error("region start >= end")]
    InvalidRange,
    #[error("invalid permissions string")]
    InvalidPermissions,
    #[error("regions are not strictly increasing by start address")]
    OutOfOrder,
    #[error("region overlaps the previous region")]
    OverlapsPrevious,
    #[error("address does not fit in 64 bits")]
    AddressOverflow,
}

/// A parse failure pinned to the 1-based input line that caused it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line_number}: {reason}")]
pub struct ParseError {
    pub line_number: usize,
    pub reason: ParseErrorReason,
}

impl ParseError {
    pub fn new(line_number: usize, reason: ParseErrorReason) -> Self {
        Self {
            line_number,
            reason,
        }
    }
}

/// Error surface for reading a maps snapshot straight from a file or
/// `/proc/<pid>/maps`, where I/O can fail independently of parsing.
#[derive(Debug, Error)]
pub enum MapsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
