use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Row mapping error at output row {row}: {message}")]
    RowMapping { row: u32, message: String },

    #[error("Output write error: {0}")]
    OutputWrite(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Header layout error: {0}")]
    Layout(String),
}
