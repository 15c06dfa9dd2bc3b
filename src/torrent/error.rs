use thiserror::Error;

use crate::bencode::DecodeError;

/// Reasons a decoded tree cannot be turned into a `Torrent`.
#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("bencode {0}")]
    Decode(#[from] DecodeError),

    #[error("root of a .torrent file must be a dictionary")]
    NotADictionary,

    #[error("missing field '{name}'")]
    MissingField { name: String },

    #[error("field '{name}' must be {expected}")]
    WrongFieldType { name: String, expected: &'static str },

    #[error("field '{name}' is invalid: {reason}")]
    InvalidFieldValue { name: String, reason: &'static str },

    #[error("field 'pieces' is {len} bytes long, not a multiple of 20")]
    InvalidPieceLength { len: usize },

    #[error("missing or malformed 'info' field")]
    MissingInfoField,

    #[error("I/O error while reading torrent: {0}")]
    Io(#[from] std::io::Error),
}
