//! Error types for model loading

use thiserror::Error;

/// Errors that can occur while loading an ArchiMate model
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model file does not exist
    #[error("Model file not found: {0}")]
    NotFound(String),

    /// Error reading the model file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document parsed but is not an ArchiMate model
    #[error("Invalid model structure: {0}")]
    InvalidStructure(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
