//! Per-alternative dispatch of the standard traits.
//!
//! Each trait here is implemented for alternative lists whose elements all
//! implement the corresponding standard trait, and walks the list down to the
//! alternative named by the tag.

use core::{
    any::{self, TypeId},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ptr,
};

use crate::repr::{AltList, Cons, Nil};

fn head<T, U>(this: *const Cons<T, U>) -> *const T {
    this.cast()
}

fn tail<T, U>(this: *const Cons<T, U>) -> *const U {
    this.cast()
}

macro_rules! past_the_end {
    ($tag:ident) => {
        unreachable!("alternative {} is past the end of the list", $tag)
    };
}

pub trait AltClone: AltList {
    #[doc(hidden)]
    unsafe fn clone_into(src: *const Self::Repr, dst: *mut Self::Repr, tag: u8);

    #[doc(hidden)]
    unsafe fn clone_from(dst: *mut Self::Repr, src: *const Self::Repr, tag: u8);
}

impl AltClone for () {
    unsafe fn clone_into(_: *const Nil, _: *mut Nil, tag: u8) {
        past_the_end!(tag)
    }

    unsafe fn clone_from(_: *mut Nil, _: *const Nil, tag: u8) {
        past_the_end!(tag)
    }
}

impl<Head: Clone, Tail: AltClone> AltClone for (Head, Tail) {
    unsafe fn clone_into(src: *const Self::Repr, dst: *mut Self::Repr, tag: u8) {
        if tag == 0 {
            unsafe {
                let value = (*head(src)).clone();
                ptr::write(head(dst).cast_mut(), value)
            }
        } else {
            unsafe { Tail::clone_into(tail(src), tail(dst).cast_mut(), tag - 1) }
        }
    }

    unsafe fn clone_from(dst: *mut Self::Repr, src: *const Self::Repr, tag: u8) {
        if tag == 0 {
            unsafe { (*head(dst).cast_mut()).clone_from(&*head(src)) }
        } else {
            unsafe { Tail::clone_from(tail(dst).cast_mut(), tail(src), tag - 1) }
        }
    }
}

/// Alternative lists whose every alternative is `Copy`, so that a variant
/// over them can be copied as one flat block.
///
/// # Safety
///
/// No alternative may have drop glue or a non-bitwise copy.
pub unsafe trait AltCopy: AltList {}

unsafe impl AltCopy for () {}

unsafe impl<Head: Copy, Tail: AltCopy> AltCopy for (Head, Tail) {}

pub trait AltPartialEq: AltList {
    #[doc(hidden)]
    unsafe fn eq(this: *const Self::Repr, other: *const Self::Repr, tag: u8) -> bool;
}

impl AltPartialEq for () {
    unsafe fn eq(_: *const Nil, _: *const Nil, tag: u8) -> bool {
        past_the_end!(tag)
    }
}

impl<Head: PartialEq, Tail: AltPartialEq> AltPartialEq for (Head, Tail) {
    unsafe fn eq(this: *const Self::Repr, other: *const Self::Repr, tag: u8) -> bool {
        if tag == 0 {
            unsafe { *head(this) == *head(other) }
        } else {
            unsafe { Tail::eq(tail(this), tail(other), tag - 1) }
        }
    }
}

pub trait AltPartialOrd: AltPartialEq {
    #[doc(hidden)]
    unsafe fn partial_cmp(
        this: *const Self::Repr,
        other: *const Self::Repr,
        tag: u8,
    ) -> Option<Ordering>;
}

impl AltPartialOrd for () {
    unsafe fn partial_cmp(_: *const Nil, _: *const Nil, tag: u8) -> Option<Ordering> {
        past_the_end!(tag)
    }
}

impl<Head: PartialOrd, Tail: AltPartialOrd> AltPartialOrd for (Head, Tail) {
    unsafe fn partial_cmp(
        this: *const Self::Repr,
        other: *const Self::Repr,
        tag: u8,
    ) -> Option<Ordering> {
        if tag == 0 {
            unsafe { (*head(this)).partial_cmp(&*head(other)) }
        } else {
            unsafe { Tail::partial_cmp(tail(this), tail(other), tag - 1) }
        }
    }
}

pub trait AltOrd: AltPartialOrd {
    #[doc(hidden)]
    unsafe fn cmp(this: *const Self::Repr, other: *const Self::Repr, tag: u8) -> Ordering;
}

impl AltOrd for () {
    unsafe fn cmp(_: *const Nil, _: *const Nil, tag: u8) -> Ordering {
        past_the_end!(tag)
    }
}

impl<Head: Ord, Tail: AltOrd> AltOrd for (Head, Tail) {
    unsafe fn cmp(this: *const Self::Repr, other: *const Self::Repr, tag: u8) -> Ordering {
        if tag == 0 {
            unsafe { (*head(this)).cmp(&*head(other)) }
        } else {
            unsafe { Tail::cmp(tail(this), tail(other), tag - 1) }
        }
    }
}

pub trait AltHash: AltList {
    #[doc(hidden)]
    unsafe fn hash<H: Hasher>(this: *const Self::Repr, tag: u8, state: &mut H);
}

impl AltHash for () {
    unsafe fn hash<H: Hasher>(_: *const Nil, tag: u8, _: &mut H) {
        past_the_end!(tag)
    }
}

impl<Head: Hash, Tail: AltHash> AltHash for (Head, Tail) {
    unsafe fn hash<H: Hasher>(this: *const Self::Repr, tag: u8, state: &mut H) {
        if tag == 0 {
            unsafe { (*head(this)).hash(state) }
        } else {
            unsafe { Tail::hash(tail(this), tag - 1, state) }
        }
    }
}

pub trait AltDebug: AltList {
    #[doc(hidden)]
    unsafe fn fmt(this: *const Self::Repr, tag: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl AltDebug for () {
    unsafe fn fmt(_: *const Nil, tag: u8, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        past_the_end!(tag)
    }
}

impl<Head: fmt::Debug, Tail: AltDebug> AltDebug for (Head, Tail) {
    unsafe fn fmt(this: *const Self::Repr, tag: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if tag == 0 {
            unsafe { fmt::Debug::fmt(&*head(this), f) }
        } else {
            unsafe { Tail::fmt(tail(this), tag - 1, f) }
        }
    }
}

pub trait AltDisplay: AltList {
    #[doc(hidden)]
    unsafe fn fmt(this: *const Self::Repr, tag: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl AltDisplay for () {
    unsafe fn fmt(_: *const Nil, tag: u8, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        past_the_end!(tag)
    }
}

impl<Head: fmt::Display, Tail: AltDisplay> AltDisplay for (Head, Tail) {
    unsafe fn fmt(this: *const Self::Repr, tag: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if tag == 0 {
            unsafe { fmt::Display::fmt(&*head(this), f) }
        } else {
            unsafe { Tail::fmt(tail(this), tag - 1, f) }
        }
    }
}

/// Names of the alternatives, for diagnostics.
pub trait AltMeta: AltList {
    /// The name of the alternative at ordinal `tag`.
    fn type_name(tag: u8) -> &'static str;
}

impl AltMeta for () {
    fn type_name(tag: u8) -> &'static str {
        past_the_end!(tag)
    }
}

impl<Head, Tail: AltMeta> AltMeta for (Head, Tail) {
    fn type_name(tag: u8) -> &'static str {
        match tag {
            0 => any::type_name::<Head>(),
            _ => Tail::type_name(tag - 1),
        }
    }
}

/// Runtime identities of `'static` alternatives.
pub trait AltIdentity: AltMeta + 'static {
    /// The `TypeId` of the alternative at ordinal `tag`.
    fn type_id(tag: u8) -> TypeId;

    /// Whether any alternative has the `TypeId` `id`.
    fn contains(id: TypeId) -> bool;

    /// Whether no alternative appears twice in the list.
    fn all_distinct() -> bool;
}

impl AltIdentity for () {
    fn type_id(tag: u8) -> TypeId {
        past_the_end!(tag)
    }

    fn contains(_: TypeId) -> bool {
        false
    }

    fn all_distinct() -> bool {
        true
    }
}

impl<Head: 'static, Tail: AltIdentity> AltIdentity for (Head, Tail) {
    fn type_id(tag: u8) -> TypeId {
        match tag {
            0 => TypeId::of::<Head>(),
            _ => Tail::type_id(tag - 1),
        }
    }

    fn contains(id: TypeId) -> bool {
        id == TypeId::of::<Head>() || Tail::contains(id)
    }

    fn all_distinct() -> bool {
        !Tail::contains(TypeId::of::<Head>()) && Tail::all_distinct()
    }
}
