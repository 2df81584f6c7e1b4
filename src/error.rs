use std::path::PathBuf;
use thiserror::Error;

pub type CapTableResult<T> = Result<T, CapTableError>;

#[derive(Error, Debug)]
pub enum CapTableError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Sheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { sheet: String, path: PathBuf },

    #[error("Write error: {0}")]
    Write(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CapTableError {
    /// Short machine-readable kind, used by the API envelope
    pub fn kind(&self) -> &'static str {
        match self {
            CapTableError::MissingFile(_) => "missing_file",
            CapTableError::Format(_) => "format",
            CapTableError::SheetNotFound { .. } => "sheet_not_found",
            CapTableError::Write(_) => "write",
            CapTableError::Workbook(_) => "workbook",
            CapTableError::Io(_) => "io",
            CapTableError::Config(_) => "config",
            CapTableError::Json(_) => "json",
        }
    }
}
