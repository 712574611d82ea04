//! The alternative catalog and the raw storage backing a [`Variant`].
//!
//! # Implementation details
//!
//! A variant is a hand-written tagged union. The alternative list is a
//! type-level cons list, and the storage is the matching nest of unions:
//!
//! ```rust,no_run
//! # use core::convert::Infallible;
//! # use core::mem::{ManuallyDrop, MaybeUninit};
//!
//! struct Nil(Infallible);
//! #[repr(C)]
//! union Cons<T, Next> {
//!     data: ManuallyDrop<T>,
//!     next: ManuallyDrop<Next>,
//! }
//!
//! // For example only. Not actually defined.
//! struct RawVariant2<T1, T2> {
//!     tag: u8,
//!     storage: MaybeUninit<Cons<T1, Cons<T2, Nil>>>,
//! }
//! ```
//!
//! Every union is `#[repr(C)]`, so all alternatives start at offset zero and
//! the storage is as large and as aligned as its largest alternative. The
//! storage itself never knows which alternative is live; the tag kept next
//! to it by [`Variant`] does.
//!
//! [`Variant`]: crate::Variant

use core::{
    convert::Infallible,
    mem::{self, ManuallyDrop, MaybeUninit},
    ptr,
};

use crate::tag::{Ordinal, UInt, UTerm};

/// The terminator type of the underlying union of a [`Variant`].
///
/// [`Variant`]: crate::Variant
pub struct Nil(#[allow(dead_code)] Infallible);

/// The accumulator type of the underlying union of a [`Variant`].
///
/// [`Variant`]: crate::Variant
#[repr(C)]
pub union Cons<T, U> {
    data: ManuallyDrop<T>,
    next: ManuallyDrop<U>,
}

unsafe fn head<T, U>(this: *mut Cons<T, U>) -> *mut T {
    unsafe { ptr::addr_of_mut!((*this).data) }.cast()
}

unsafe fn tail<T, U>(this: *mut Cons<T, U>) -> *mut U {
    unsafe { ptr::addr_of_mut!((*this).next) }.cast()
}

/// The trait that alternative lists implement to get their tagged union
/// representation.
pub trait AltList: Count {
    /// The underlying union of all alternatives.
    type Repr;

    /// Whether any alternative has drop glue.
    const NEEDS_DROP: bool;

    #[doc(hidden)]
    unsafe fn drop_in_place(this: *mut Self::Repr, tag: u8);

    #[doc(hidden)]
    unsafe fn swap(this: *mut Self::Repr, other: *mut Self::Repr, tag: u8);
}

impl AltList for () {
    type Repr = Nil;

    const NEEDS_DROP: bool = false;

    unsafe fn drop_in_place(_: *mut Nil, tag: u8) {
        unreachable!("dropping alternative {tag} past the end of the list")
    }

    unsafe fn swap(_: *mut Nil, _: *mut Nil, tag: u8) {
        unreachable!("swapping alternative {tag} past the end of the list")
    }
}

impl<Head, Tail> AltList for (Head, Tail)
where
    Tail: AltList,
{
    type Repr = Cons<Head, Tail::Repr>;

    const NEEDS_DROP: bool = mem::needs_drop::<Head>() || Tail::NEEDS_DROP;

    unsafe fn drop_in_place(this: *mut Self::Repr, tag: u8) {
        if tag == 0 {
            unsafe { ptr::drop_in_place(head(this)) }
        } else {
            unsafe { Tail::drop_in_place(tail(this), tag - 1) }
        }
    }

    unsafe fn swap(this: *mut Self::Repr, other: *mut Self::Repr, tag: u8) {
        if tag == 0 {
            unsafe { mem::swap(&mut *head(this), &mut *head(other)) }
        } else {
            unsafe { Tail::swap(tail(this), tail(other), tag - 1) }
        }
    }
}

/// Alternative lists with at least one entry. Only these can back a
/// [`Variant`](crate::Variant).
pub trait NonEmpty: AltList {
    /// The alternative built by `Default`.
    type First;
}

impl<Head, Tail: AltList> NonEmpty for (Head, Tail) {
    type First = Head;
}

/// The trait that alternative lists implement to locate alternative `T` at
/// ordinal `U`.
///
/// When `T` is known the ordinal is inferred, and when `U` is known the
/// alternative is. If `T` appears twice in the list, resolving by type is
/// ambiguous and fails to compile; resolving by ordinal still works.
pub trait Split<T, U: Ordinal>: AltList {
    #[doc(hidden)]
    unsafe fn as_ptr(this: *const Self::Repr) -> *const T;

    #[doc(hidden)]
    unsafe fn as_mut_ptr(this: *mut Self::Repr) -> *mut T;
}

impl<Head, Tail> Split<Head, UTerm> for (Head, Tail)
where
    Tail: AltList,
{
    unsafe fn as_ptr(this: *const Self::Repr) -> *const Head {
        unsafe { head(this.cast_mut()) }
    }

    unsafe fn as_mut_ptr(this: *mut Self::Repr) -> *mut Head {
        unsafe { head(this) }
    }
}

impl<Head, Tail, T, U: Ordinal> Split<T, UInt<U>> for (Head, Tail)
where
    Tail: Split<T, U>,
{
    unsafe fn as_ptr(this: *const Self::Repr) -> *const T {
        let ptr = unsafe { Tail::as_ptr(tail(this.cast_mut())) };
        debug_assert_eq!(ptr.cast(), this);
        ptr
    }

    unsafe fn as_mut_ptr(this: *mut Self::Repr) -> *mut T {
        let ptr = unsafe { Tail::as_mut_ptr(tail(this)) };
        debug_assert_eq!(ptr.cast(), this);
        ptr
    }
}

/// Resolves the alternative at ordinal `U`.
pub trait TypeAt<U: Ordinal> {
    /// The alternative at ordinal `U`.
    type Output;
}

impl<Head, Tail> TypeAt<UTerm> for (Head, Tail) {
    type Output = Head;
}

impl<Head, Tail, U: Ordinal> TypeAt<UInt<U>> for (Head, Tail)
where
    Tail: TypeAt<U>,
{
    type Output = Tail::Output;
}

/// The alternative of list `S` at ordinal `U`.
pub type Alt<S, U> = <S as TypeAt<U>>::Output;

/// Counts the number of elements in a type list using ordinals.
pub trait Count {
    /// The number of elements in the type list, measured by ordinals.
    type Count: Ordinal;
}

impl Count for () {
    type Count = UTerm;
}

impl<Head, Tail> Count for (Head, Tail)
where
    Tail: Count,
{
    type Count = UInt<Tail::Count>;
}

/// Untyped storage wide and aligned enough for every alternative of `S`.
///
/// All accessors take the occupant type from the caller. Calling them with a
/// type that is not currently live is undefined behavior.
pub struct Storage<S: AltList> {
    data: MaybeUninit<S::Repr>,
}

impl<S: AltList> Storage<S> {
    /// Storage holding no live value.
    pub const fn uninit() -> Self {
        Storage {
            data: MaybeUninit::uninit(),
        }
    }

    /// Moves `value` into the storage.
    ///
    /// The value is complete before the storage is touched, so a failing
    /// constructor can never leave it half-written.
    ///
    /// # Safety
    ///
    /// The storage must hold no live value, or the live value is leaked.
    pub unsafe fn construct<T, U>(&mut self, value: T) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        unsafe {
            let ptr = S::as_mut_ptr(self.data.as_mut_ptr());
            ptr.write(value);
            &mut *ptr
        }
    }

    /// Runs the destructor of the live `T`.
    ///
    /// # Safety
    ///
    /// The storage must hold a live `T`, which is dead afterwards.
    pub unsafe fn destroy<T, U>(&mut self)
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        unsafe { ptr::drop_in_place(S::as_mut_ptr(self.data.as_mut_ptr())) }
    }

    /// Runs the destructor of the alternative at ordinal `tag`.
    ///
    /// # Safety
    ///
    /// The storage must hold a live value of the alternative at `tag`.
    pub unsafe fn destroy_active(&mut self, tag: u8) {
        unsafe { S::drop_in_place(self.data.as_mut_ptr(), tag) }
    }

    /// # Safety
    ///
    /// The storage must hold a live `T`.
    pub unsafe fn get<T, U>(&self) -> &T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        unsafe { &*S::as_ptr(self.data.as_ptr()) }
    }

    /// # Safety
    ///
    /// The storage must hold a live `T`.
    pub unsafe fn get_mut<T, U>(&mut self) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        unsafe { &mut *S::as_mut_ptr(self.data.as_mut_ptr()) }
    }

    /// Moves the live `T` out of the storage.
    ///
    /// # Safety
    ///
    /// The storage must hold a live `T`, which must afterwards be treated as
    /// dead.
    pub unsafe fn read<T, U>(&self) -> T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        unsafe { ptr::read(S::as_ptr(self.data.as_ptr())) }
    }

    /// Swaps the live values of alternative `tag` in both storages.
    ///
    /// # Safety
    ///
    /// Both storages must hold a live value of the alternative at `tag`.
    pub unsafe fn swap_active(&mut self, other: &mut Self, tag: u8) {
        unsafe { S::swap(self.data.as_mut_ptr(), other.data.as_mut_ptr(), tag) }
    }

    /// Bitwise copy of the whole region, live or not.
    ///
    /// # Safety
    ///
    /// Whatever is live in the copy must not be dropped twice: either the
    /// source is forgotten afterwards or every alternative is `Copy`.
    pub(crate) unsafe fn duplicate(&self) -> Self {
        unsafe { ptr::read(self) }
    }

    pub(crate) fn as_ptr(&self) -> *const S::Repr {
        self.data.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut S::Repr {
        self.data.as_mut_ptr()
    }
}

#[cfg(test)]
mod tests {
    use core::mem::{align_of, size_of};
    use std::{rc::Rc, string::String};

    use super::*;
    use crate::tag::*;

    type L = crate::T![u8, u64, [u8; 12]];

    #[test]
    fn storage_layout() {
        assert_eq!(size_of::<Storage<L>>(), 16);
        assert_eq!(align_of::<Storage<L>>(), align_of::<u64>());
        assert_eq!(size_of::<Storage<crate::T![u8]>>(), 1);
        assert_eq!(<<L as Count>::Count as Ordinal>::VALUE, 3);
    }

    #[test]
    fn needs_drop_is_a_disjunction() {
        assert!(!<L as AltList>::NEEDS_DROP);
        assert!(<crate::T![u8, String] as AltList>::NEEDS_DROP);
    }

    #[test]
    fn construct_access_destroy() {
        let marker = Rc::new(());
        let mut storage = Storage::<crate::T![u32, Rc<()>]>::uninit();

        unsafe {
            *storage.construct(5u32) += 1;
            assert_eq!(*storage.get::<u32, _>(), 6);

            storage.construct(marker.clone());
            assert_eq!(Rc::strong_count(&marker), 2);
            assert!(Rc::ptr_eq(storage.get_mut::<Rc<()>, U1>(), &marker));

            storage.destroy::<Rc<()>, _>();
            assert_eq!(Rc::strong_count(&marker), 1);

            storage.construct(marker.clone());
            storage.destroy_active(1);
            assert_eq!(Rc::strong_count(&marker), 1);
        }
    }

    #[test]
    fn swap_and_read() {
        let mut a = Storage::<crate::T![u8, String]>::uninit();
        let mut b = Storage::<crate::T![u8, String]>::uninit();

        unsafe {
            a.construct(String::from("left"));
            b.construct(String::from("right"));
            a.swap_active(&mut b, 1);
            assert_eq!(a.read::<String, _>(), "right");
            assert_eq!(b.read::<String, _>(), "left");
        }
    }

    #[test]
    fn type_at_resolves() {
        let value: Alt<L, U1> = 7u64;
        let first: <L as NonEmpty>::First = 3u8;
        assert_eq!(value, 7);
        assert_eq!(first, 3);
    }
}
