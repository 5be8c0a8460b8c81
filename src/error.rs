use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("No signature found")]
    NoSignatureFound,

    #[error("No valid ink contours found")]
    NoValidInkFound,

    #[error("Failed to encode output: {0}")]
    EncodeError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ExtractError {
    /// Stable identifier used in batch reports
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::DecodeError(_) => "DECODE_ERROR",
            ExtractError::NoSignatureFound => "NO_SIGNATURE",
            ExtractError::NoValidInkFound => "NO_VALID_INK",
            ExtractError::EncodeError(_) => "ENCODE_ERROR",
            ExtractError::InvalidConfig(_) => "INVALID_CONFIG",
            ExtractError::Io(_) => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ExtractError::DecodeError("x".to_string()),
            ExtractError::NoSignatureFound,
            ExtractError::NoValidInkFound,
            ExtractError::EncodeError("x".to_string()),
            ExtractError::InvalidConfig("x".to_string()),
            ExtractError::Io("x".to_string()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ExtractError::DecodeError("scan.jpg: unexpected EOF".to_string());
        assert_eq!(err.to_string(), "Failed to decode image: scan.jpg: unexpected EOF");
    }
}
