//! Type-level ordinals naming the position of an alternative in a list.

#![allow(missing_docs)]

use core::marker::PhantomData;

/// The reserved tag of a valueless [`Variant`](crate::Variant).
///
/// A list may hold at most 255 alternatives: storing a value at this ordinal
/// is rejected when the constructor is instantiated, and ordinals past it
/// overflow.
pub const NPOS: u8 = u8::MAX;

pub struct UTerm;

pub struct UInt<U>(PhantomData<U>);

pub trait Ordinal {
    const VALUE: u8;

    /// The tag written into a variant holding the alternative at this
    /// ordinal. Evaluating it for [`NPOS`] fails to compile.
    ///
    /// ```compile_fail
    /// use tvariant::tag::{Ordinal, NPOS};
    ///
    /// struct Last;
    /// impl Ordinal for Last {
    ///     const VALUE: u8 = NPOS;
    /// }
    ///
    /// let tag = Last::TAG;
    /// assert_eq!(tag, NPOS);
    /// ```
    const TAG: u8 = {
        assert!(Self::VALUE != NPOS, "ordinal collides with the valueless tag");
        Self::VALUE
    };
}

impl Ordinal for UTerm {
    const VALUE: u8 = 0;
}

impl<U: Ordinal> Ordinal for UInt<U> {
    const VALUE: u8 = 1 + U::VALUE;
}

pub type U0 = UTerm;
pub type U1 = UInt<U0>;
pub type U2 = UInt<U1>;
pub type U3 = UInt<U2>;
pub type U4 = UInt<U3>;
pub type U5 = UInt<U4>;
pub type U6 = UInt<U5>;
pub type U7 = UInt<U6>;
pub type U8 = UInt<U7>;
pub type U9 = UInt<U8>;

pub type U10 = UInt<U9>;
pub type U11 = UInt<U10>;
pub type U12 = UInt<U11>;
pub type U13 = UInt<U12>;
pub type U14 = UInt<U13>;
pub type U15 = UInt<U14>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_count_up() {
        assert_eq!(U0::VALUE, 0);
        assert_eq!(U1::VALUE, 1);
        assert_eq!(U7::VALUE, 7);
        assert_eq!(U15::VALUE, 15);
        assert_ne!(U15::VALUE, NPOS);
    }

    #[test]
    fn tags_match_ordinals() {
        assert_eq!(U0::TAG, 0);
        assert_eq!(U9::TAG, U9::VALUE);
        assert_eq!(U15::TAG, 15);
    }
}
