//! Common error infrastructure for agent-core.
//!
//! Domain-specific rejections of a submission live in
//! [`crate::validation::ValidationError`]; this module holds the errors raised
//! while building protocol values plus the severity classification every
//! crate in the workspace reports against.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by how the submitting transaction should be treated:
/// - **Validation**: business-rule rejection; the transaction fails but stored
///   state is untouched and later submissions are unaffected
/// - **Internal**: unexpected inconsistency that requires investigation
/// - **Fatal**: the submission cannot be processed at all (bad proof,
///   malformed witness, storage failure)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// Soft rejection of a well-formed submission.
    ///
    /// Examples: stale message number, security code mismatch
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// Examples: a hash squeeze that produced no output
    Internal,

    /// Unrecoverable for this submission.
    ///
    /// Examples: proof fails verification, payload exceeds buffer capacity
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this is a soft, business-rule rejection.
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::Validation)
    }
}

impl core::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing protocol values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Payload does not fit the fixed-capacity message buffer.
    #[error("Input of size {size} is larger than expected size of {capacity}")]
    MessageTooLong { size: usize, capacity: usize },

    /// Security code must be exactly two symbols.
    #[error("security code must have exactly 2 symbols, got {0}")]
    InvalidSecurityCode(usize),

    /// Poseidon sponge did not yield an output element.
    #[error("Poseidon squeeze failed")]
    HashSqueeze,

    /// Field element could not be encoded or decoded.
    #[error("field encoding error: {0}")]
    FieldEncoding(String),
}

impl CoreError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::HashSqueeze => ErrorSeverity::Internal,
            Self::MessageTooLong { .. } | Self::InvalidSecurityCode(_) | Self::FieldEncoding(_) => {
                ErrorSeverity::Fatal
            }
        }
    }
}
