use thiserror::Error;

/// Failures from decoding the wire format (spec §6: length-prefixed,
/// field-by-field, must round-trip exactly).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input while decoding {0}")]
    UnexpectedEof(&'static str),
    #[error("varint exceeds 64 bits")]
    VarintTooLarge,
    #[error("length prefix {0} exceeds the {1} byte cap for this field")]
    LengthTooLarge(u64, usize),
    #[error("fixed-width value has wrong length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("trailing bytes after decoding a complete value")]
    TrailingBytes,
}
