use thiserror::Error;

/// Engine-level failures. Image fetch problems never surface here, they
/// degrade to omitted images inside the resolver.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("render task panicked: {0}")]
    RenderPanic(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Input errors are the caller's fault and map to 422 at the API edge.
    pub fn is_input_error(&self) -> bool {
        matches!(self, EngineError::InvalidInput(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
