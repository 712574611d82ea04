#![doc = include_str!("../README.md")]
#![no_std]
#![deny(future_incompatible)]
#![deny(rust_2018_idioms)]
#![deny(rust_2024_compatibility)]

#[cfg(test)]
extern crate std;

use core::{
    any::TypeId,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

mod assign;
pub mod derive;
mod error;
mod macros;
pub mod repr;
pub mod tag;

pub use self::error::AccessError;
use self::{
    repr::{NonEmpty, Split, Storage, TypeAt},
    tag::{NPOS, Ordinal, UTerm},
};

/// A slot holding exactly one value out of the alternative list `S`, or
/// nothing at all after an interrupted mutation.
///
/// `S` is a type-level list such as `(i32, (String, ()))`, usually written
/// with the [`Variant!`] or [`T!`] macros. Alternatives are named either by
/// type (`get::<String, _>()`, the ordinal is inferred) or by ordinal
/// (`get_at::<U1, _>()`, the type is inferred).
///
/// A variant is valueless (`is_empty()`, tag [`NPOS`]) only when a mutation
/// failed halfway, when it was assigned from a valueless variant, or when its
/// value was moved out through `&mut self`.
///
/// # Duplicate alternatives
///
/// A list naming the same type twice is accepted. That type can no longer be
/// named by type, since its ordinal is ambiguous, but ordinal access keeps
/// working and [`Variant::all_distinct`] reports the duplicate.
///
/// ```rust
/// use tvariant::{Variant, tag::U2};
///
/// type Twice = Variant![u8, String, u8];
/// let v = Twice::new_at::<U2, _>(3u8);
/// assert_eq!(v.tag(), 2);
/// assert_eq!(v.get_at::<U2, _>(), Ok(&3));
/// assert!(!Twice::all_distinct());
/// ```
pub struct Variant<S: NonEmpty> {
    tag: u8,
    storage: Storage<S>,
}

impl<S: NonEmpty> Variant<S> {
    /// The number of alternatives.
    pub const LEN: u8 = <S::Count as Ordinal>::VALUE;

    /// Whether dropping a variant over `S` may run any destructor.
    pub const NEEDS_DROP: bool = S::NEEDS_DROP;

    /// Construct a `Variant` holding `value`, choosing the alternative by the
    /// type of the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tvariant::Variant;
    ///
    /// let v: Variant![i32, String] = Variant::new(String::from("hello"));
    /// assert_eq!(v.tag(), 1);
    /// ```
    pub fn new<T, U>(value: T) -> Self
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        let mut storage = Storage::uninit();
        unsafe { storage.construct::<T, U>(value) };
        Variant {
            tag: U::TAG,
            storage,
        }
    }

    /// Construct a `Variant` holding `value` as the alternative at ordinal `U`.
    pub fn new_at<U, T>(value: T) -> Self
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        Self::new::<T, U>(value)
    }

    pub fn new_with<T, U>(f: impl FnOnce() -> T) -> Self
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        Self::new::<T, U>(f())
    }

    /// Construct a `Variant` from a fallible constructor. No variant exists
    /// if the constructor fails.
    pub fn try_new_with<T, U, E>(f: impl FnOnce() -> Result<T, E>) -> Result<Self, E>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        f().map(Self::new::<T, U>)
    }

    /// Construct a `Variant` holding a collection built from `iter`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tvariant::Variant;
    ///
    /// let v = <Variant![u8, Vec<u8>]>::from_iter_in::<Vec<u8>, _, _>([1, 2, 3]);
    /// assert_eq!(v.get::<Vec<u8>, _>().unwrap(), &[1, 2, 3]);
    /// ```
    pub fn from_iter_in<T, U, I>(iter: I) -> Self
    where
        S: Split<T, U>,
        U: Ordinal,
        I: IntoIterator,
        T: FromIterator<I::Item>,
    {
        Self::new::<T, U>(iter.into_iter().collect())
    }

    pub fn from_iter_at<U, T, I>(iter: I) -> Self
    where
        S: Split<T, U>,
        U: Ordinal,
        I: IntoIterator,
        T: FromIterator<I::Item>,
    {
        Self::from_iter_in::<T, U, I>(iter)
    }
}

impl<S: NonEmpty> Variant<S> {
    /// The ordinal of the active alternative, or [`NPOS`] if valueless.
    pub const fn tag(&self) -> u8 {
        self.tag
    }

    pub const fn is_empty(&self) -> bool {
        self.tag == NPOS
    }

    /// The ordinal of alternative `T`.
    pub const fn ordinal_of<T, U>() -> u8
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        U::VALUE
    }

    pub fn holds<T, U>(&self) -> bool
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.tag == U::VALUE
    }

    pub fn holds_at<U>(&self) -> bool
    where
        S: TypeAt<U>,
        U: Ordinal,
    {
        self.tag == U::VALUE
    }

    pub fn type_name(&self) -> Option<&'static str>
    where
        S: derive::AltMeta,
    {
        (!self.is_empty()).then(|| <S as derive::AltMeta>::type_name(self.tag))
    }

    pub fn type_id(&self) -> Option<TypeId>
    where
        S: derive::AltIdentity,
    {
        (!self.is_empty()).then(|| <S as derive::AltIdentity>::type_id(self.tag))
    }

    /// Whether every alternative of `S` is a distinct type.
    pub fn all_distinct() -> bool
    where
        S: derive::AltIdentity,
    {
        <S as derive::AltIdentity>::all_distinct()
    }

    fn check<U: Ordinal>(&self) -> Result<(), AccessError> {
        if self.tag == U::VALUE {
            Ok(())
        } else {
            Err(AccessError::new(U::VALUE, self.tag))
        }
    }
}

impl<S: NonEmpty> Variant<S> {
    /// Borrow the value of alternative `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tvariant::Variant;
    ///
    /// let v: Variant![i32, String] = Variant::new(7);
    /// assert_eq!(v.get::<i32, _>(), Ok(&7));
    /// assert!(v.get::<String, _>().is_err());
    /// ```
    pub fn get<T, U>(&self) -> Result<&T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.check::<U>()?;
        Ok(unsafe { self.storage.get::<T, U>() })
    }

    pub fn get_mut<T, U>(&mut self) -> Result<&mut T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.check::<U>()?;
        Ok(unsafe { self.storage.get_mut::<T, U>() })
    }

    /// Move the value of alternative `T` out, leaving the variant valueless.
    ///
    /// The variant is untouched if `T` is not active.
    pub fn take_alt<T, U>(&mut self) -> Result<T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.check::<U>()?;
        self.tag = NPOS;
        Ok(unsafe { self.storage.read::<T, U>() })
    }

    pub fn into_alt<T, U>(mut self) -> Result<T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.take_alt::<T, U>()
    }

    pub fn get_if<T, U>(&self) -> Option<&T>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        (self.tag == U::VALUE).then(|| unsafe { self.storage.get::<T, U>() })
    }

    pub fn get_if_mut<T, U>(&mut self) -> Option<&mut T>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        (self.tag == U::VALUE).then(|| unsafe { self.storage.get_mut::<T, U>() })
    }

    pub fn get_at<U, T>(&self) -> Result<&T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.get::<T, U>()
    }

    pub fn get_at_mut<U, T>(&mut self) -> Result<&mut T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.get_mut::<T, U>()
    }

    pub fn take_at<U, T>(&mut self) -> Result<T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.take_alt::<T, U>()
    }

    pub fn into_at<U, T>(self) -> Result<T, AccessError>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.into_alt::<T, U>()
    }

    pub fn get_if_at<U, T>(&self) -> Option<&T>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.get_if::<T, U>()
    }

    pub fn get_if_at_mut<U, T>(&mut self) -> Option<&mut T>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.get_if_mut::<T, U>()
    }
}

impl<Head: Default, Tail: repr::AltList> Default for Variant<(Head, Tail)> {
    /// Holds the default value of the first alternative.
    fn default() -> Self {
        Variant::new::<Head, UTerm>(Head::default())
    }
}

impl<S: NonEmpty> Drop for Variant<S> {
    fn drop(&mut self) {
        if !self.is_empty() {
            unsafe { self.storage.destroy_active(self.tag) }
        }
    }
}

impl<S: NonEmpty + derive::AltDebug> fmt::Debug for Variant<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<valueless>");
        }
        unsafe { <S as derive::AltDebug>::fmt(self.storage.as_ptr(), self.tag, f) }
    }
}

impl<S: NonEmpty + derive::AltDisplay> fmt::Display for Variant<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<valueless>");
        }
        unsafe { <S as derive::AltDisplay>::fmt(self.storage.as_ptr(), self.tag, f) }
    }
}

impl<S: NonEmpty + derive::AltPartialEq> PartialEq for Variant<S> {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && (self.is_empty()
                || unsafe {
                    <S as derive::AltPartialEq>::eq(
                        self.storage.as_ptr(),
                        other.storage.as_ptr(),
                        self.tag,
                    )
                })
    }
}

impl<S: NonEmpty + derive::AltPartialEq + Eq> Eq for Variant<S> {}

impl<S: NonEmpty + derive::AltPartialOrd> PartialOrd for Variant<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => match self.tag.cmp(&other.tag) {
                Ordering::Equal => unsafe {
                    <S as derive::AltPartialOrd>::partial_cmp(
                        self.storage.as_ptr(),
                        other.storage.as_ptr(),
                        self.tag,
                    )
                },
                other => Some(other),
            },
        }
    }
}

impl<S: NonEmpty + derive::AltOrd + Eq> Ord for Variant<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.tag.cmp(&other.tag).then_with(|| unsafe {
                <S as derive::AltOrd>::cmp(self.storage.as_ptr(), other.storage.as_ptr(), self.tag)
            }),
        }
    }
}

impl<S: NonEmpty + derive::AltHash> Hash for Variant<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        if !self.is_empty() {
            unsafe { <S as derive::AltHash>::hash(self.storage.as_ptr(), self.tag, state) }
        }
    }
}
