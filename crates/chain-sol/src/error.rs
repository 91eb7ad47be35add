use thiserror::Error;

/// Solana ledger primitive errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("no valid bump seed found for program {program_id}")]
    NoValidBumpFound { program_id: String },

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = SolError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_invalid_seeds() {
        let err = SolError::InvalidSeeds("seed 2 is 40 bytes".into());
        assert_eq!(err.to_string(), "invalid seeds: seed 2 is 40 bytes");
    }

    #[test]
    fn display_no_valid_bump() {
        let err = SolError::NoValidBumpFound {
            program_id: "11111111111111111111111111111111".into(),
        };
        assert_eq!(
            err.to_string(),
            "no valid bump seed found for program 11111111111111111111111111111111"
        );
    }

    #[test]
    fn display_signing_error() {
        let err = SolError::SigningError("ed25519 failed".into());
        assert_eq!(err.to_string(), "signing error: ed25519 failed");
    }

    #[test]
    fn display_serialization_error() {
        let err = SolError::SerializationError("compact-u16 overflow".into());
        assert_eq!(
            err.to_string(),
            "serialization error: compact-u16 overflow"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(SolError::TransactionBuildError("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
