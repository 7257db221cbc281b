use thiserror::Error;

/// Failures while reading an event file. Any of these aborts the replay;
/// business-level rejections never surface here.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read event file")]
    Io(#[from] std::io::Error),
    #[error("line {0:?} is missing fields")]
    MissingField(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("negative value {0:?}")]
    Negative(String),
    #[error("unknown side {0:?}")]
    UnknownSide(String),
    #[error("unknown order type {0:?}")]
    UnknownOrderType(String),
    #[error("the result line must be the last line of the file")]
    ResultNotAtEnd,
    #[error("no result line at end of file")]
    MissingResult,
}
