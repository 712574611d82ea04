use core::fmt;

use crate::tag::NPOS;

/// Error returned by the validating accessors of a [`Variant`] when the
/// requested alternative is not the active one.
///
/// [`Variant`]: crate::Variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessError {
    expected: u8,
    actual: u8,
}

impl AccessError {
    pub(crate) const fn new(expected: u8, actual: u8) -> Self {
        AccessError { expected, actual }
    }

    /// The ordinal the caller asked for.
    pub const fn expected(&self) -> u8 {
        self.expected
    }

    /// The tag of the variant at the time of the access, [`NPOS`] if it was
    /// valueless.
    pub const fn actual(&self) -> u8 {
        self.actual
    }

    /// Whether the access failed because the variant held no value at all.
    pub const fn is_valueless(&self) -> bool {
        self.actual == NPOS
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valueless() {
            write!(
                f,
                "bad variant access: alternative {} requested from a valueless variant",
                self.expected
            )
        } else {
            write!(
                f,
                "bad variant access: alternative {} requested, {} is active",
                self.expected, self.actual
            )
        }
    }
}

impl core::error::Error for AccessError {}

#[cfg(test)]
mod tests {
    use std::string::ToString;

    use super::*;

    #[test]
    fn messages() {
        let err = AccessError::new(1, 0);
        assert!(!err.is_valueless());
        assert_eq!(
            err.to_string(),
            "bad variant access: alternative 1 requested, 0 is active"
        );

        let err = AccessError::new(0, NPOS);
        assert!(err.is_valueless());
        assert_eq!(err.actual(), NPOS);
        assert_eq!(
            err.to_string(),
            "bad variant access: alternative 0 requested from a valueless variant"
        );
    }
}
