use thiserror::Error;

/// Error type for certificate issuance and packaging
#[derive(Error, Debug)]
pub enum PkiError {
    /// Subject or certificate parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Certificate or key generation error
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// PFX/PEM export error
    #[error("Export error: {0}")]
    ExportError(String),

    /// Issuer material import error
    #[error("Import error: {0}")]
    ImportError(String),
}

pub type Result<T> = std::result::Result<T, PkiError>;
