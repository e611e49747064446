//! Error types used throughout the compiler.
//!
//! Every validation failure carries the dotted path of the offending field
//! (`<Jewel.Ruby>.piece`, `<Style.LK.Sword>.attributes[AttackUp][2]`, ...) so
//! an author can find the bad value without a stack trace. Propagation is
//! fail-fast: the first error aborts the whole compilation pass.

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while validating and serializing a resource set.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field holds the wrong scalar kind.
    #[error("{path}: must be {expected}")]
    TypeMismatch {
        /// Dotted path of the offending field.
        path: String,
        /// Human-readable description of the accepted kind(s).
        expected: String,
    },

    /// A value falls outside its declared bounds, or a sequence has the
    /// wrong length.
    #[error("{path}: {reason}")]
    RangeViolation {
        /// Dotted path of the offending field.
        path: String,
        /// What bound or length constraint was violated.
        reason: String,
    },

    /// A string fails a required grammar (regex, time suffix, percent form).
    #[error("{path}: {reason}")]
    PatternViolation {
        /// Dotted path of the offending field.
        path: String,
        /// Which grammar the value failed.
        reason: String,
    },

    /// An id could not be resolved, resolved to the wrong category, or
    /// failed a back-reference predicate.
    #[error("{path}: {reason}")]
    Reference {
        /// Dotted path of the referencing field.
        path: String,
        /// Why the reference is invalid.
        reason: String,
    },

    /// A resource id, plus-channel key, or container write id was used twice.
    #[error("{path}: {reason}")]
    Duplicate {
        /// Dotted path of the offending field.
        path: String,
        /// Which key collided.
        reason: String,
    },

    /// The container writer was used after close, or closed twice.
    #[error("container: {reason}")]
    ContainerState {
        /// Which state transition was illegal.
        reason: String,
    },

    /// An I/O failure from the container writer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::TypeMismatch`].
    pub fn type_mismatch(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Build a [`Error::RangeViolation`].
    pub fn range(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RangeViolation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`Error::PatternViolation`].
    pub fn pattern(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PatternViolation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Reference`].
    pub fn reference(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reference {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Duplicate`].
    pub fn duplicate(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Duplicate {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_path() {
        let e = Error::range("<Jewel.Ruby>.piece", "must >= 1");
        assert_eq!(e.to_string(), "<Jewel.Ruby>.piece: must >= 1");

        let e = Error::type_mismatch("<Entry.Haste>.name", "a string");
        assert_eq!(e.to_string(), "<Entry.Haste>.name: must be a string");
    }
}
