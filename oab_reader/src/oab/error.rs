use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OabError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported version: expected 32, got {0}")]
    UnsupportedVersion(u32),

    #[error("Truncated {context}: expected {needed} bytes, got {available}")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid {context} size: {size}")]
    InvalidBlockSize { context: &'static str, size: u32 },

    #[error("Invalid length indicator: {0:#04x}")]
    InvalidVarInt(u8),

    #[error("Invalid boolean encoding: {0:#04x}")]
    InvalidBoolean(u8),

    #[error("Unknown property type ({0})")]
    UnknownType(String),

    #[error("OAB data must be parsed first")]
    NotParsed,

    #[error("property schema error: {0}")]
    Schema(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, OabError>;

impl OabError {
    pub fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        Self::Truncated {
            context,
            needed,
            available,
        }
    }

    pub fn schema(details: impl fmt::Display) -> Self {
        Self::Schema(details.to_string())
    }

    pub fn render(details: impl fmt::Display) -> Self {
        Self::Render(details.to_string())
    }
}

impl From<serde_json::Error> for OabError {
    fn from(err: serde_json::Error) -> Self {
        OabError::Schema(err.to_string())
    }
}
