use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document contains no tables to export")]
    NoTables,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid export options: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
