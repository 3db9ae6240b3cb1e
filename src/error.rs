// 🚨 Error Types - one enum for the whole public API

use crate::schema::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoletoError {
    /// The validation gate rejected the boleto; nothing was encoded.
    #[error("boleto inválido: {}", summarize(.0))]
    AttributeInvalid(Vec<ValidationError>),

    /// Field widths or derived values broke an assembly invariant.
    #[error("encoding precondition violated: {0}")]
    EncodingPrecondition(String),

    /// Checksum input contained something other than ASCII digits.
    #[error("checksum input is not numeric: {0:?}")]
    ChecksumInputInvalid(String),

    #[error("unknown bank: {0}")]
    UnknownBank(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoletoError {
    /// Validation failures carried by an `AttributeInvalid` error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            BoletoError::AttributeInvalid(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, BoletoError>;
