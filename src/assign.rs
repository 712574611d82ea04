//! Mutation of a [`Variant`]: emplace, assignment and swap.
//!
//! Every mutator that replaces the active alternative goes through the same
//! three states: the old value is live, then nothing is live and the tag is
//! [`NPOS`], then the new value is live. Only the last step writes a real
//! tag, so a constructor that panics or returns an error in the middle
//! leaves a valueless variant behind instead of a torn one.

use core::{
    mem::{self, ManuallyDrop},
    ptr,
};

use crate::{
    derive::{AltClone, AltCopy},
    repr::{NonEmpty, Split, Storage},
    tag::{NPOS, Ordinal},
    Variant,
};

/// A replacement of a variant's value that is in flight.
///
/// Dropping a transition without committing it leaves the variant valueless.
struct Transition<'a, S: NonEmpty> {
    variant: &'a mut Variant<S>,
}

impl<'a, S: NonEmpty> Transition<'a, S> {
    /// Destroys the current value and marks the variant valueless.
    fn begin(variant: &'a mut Variant<S>) -> Self {
        variant.reset();
        Transition { variant }
    }

    /// Keeps the current value live while it is assigned in place. If the
    /// transition is abandoned the value is dropped.
    fn in_place(variant: &'a mut Variant<S>) -> Self {
        debug_assert!(!variant.is_empty());
        Transition { variant }
    }

    fn commit<T, U>(self, value: T) -> &'a mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        let variant = self.release();
        unsafe { variant.storage.construct::<T, U>(value) };
        variant.tag = U::TAG;
        unsafe { variant.storage.get_mut::<T, U>() }
    }

    /// # Safety
    ///
    /// The storage must hold a live value of the alternative at `tag`.
    unsafe fn commit_tag(self, tag: u8) {
        self.release().tag = tag;
    }

    fn release(self) -> &'a mut Variant<S> {
        let this = ManuallyDrop::new(self);
        unsafe { ptr::read(&this.variant) }
    }
}

impl<S: NonEmpty> Drop for Transition<'_, S> {
    fn drop(&mut self) {
        if self.variant.is_empty() {
            log::debug!("constructing a new alternative failed, variant left valueless");
        } else {
            log::debug!(
                "assignment to alternative {} failed, variant left valueless",
                self.variant.tag
            );
            self.variant.reset();
        }
    }
}

impl<S: NonEmpty> Variant<S> {
    /// Drop the active value, if any, and become valueless.
    pub fn reset(&mut self) {
        let tag = mem::replace(&mut self.tag, NPOS);
        if tag != NPOS {
            unsafe { self.storage.destroy_active(tag) }
        }
    }

    /// Move the whole variant out, leaving this one valueless.
    pub fn take(&mut self) -> Self {
        let tag = mem::replace(&mut self.tag, NPOS);
        Variant {
            tag,
            storage: unsafe { self.storage.duplicate() },
        }
    }

    /// Replace the active value with `value` as alternative `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tvariant::Variant;
    ///
    /// let mut v: Variant![i32, String] = Variant::default();
    /// v.emplace(String::from("hello")).push('!');
    /// assert_eq!(v.get::<String, _>().unwrap(), "hello!");
    /// ```
    pub fn emplace<T, U>(&mut self, value: T) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        Transition::begin(self).commit(value)
    }

    pub fn emplace_at<U, T>(&mut self, value: T) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        self.emplace::<T, U>(value)
    }

    /// Replace the active value with the result of `f`.
    ///
    /// The old value is dropped before `f` runs. If `f` panics, the variant
    /// is valueless afterwards.
    pub fn emplace_with<T, U>(&mut self, f: impl FnOnce() -> T) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        let transition = Transition::begin(self);
        let value = f();
        transition.commit(value)
    }

    /// Replace the active value with the result of a fallible constructor.
    ///
    /// The old value is dropped before `f` runs. If `f` fails, the error is
    /// returned and the variant is valueless.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tvariant::Variant;
    ///
    /// let mut v: Variant![u8, i32] = Variant::new(7i32);
    /// let res = v.try_emplace_with::<u8, _, _>(|| u8::try_from(300));
    /// assert!(res.is_err());
    /// assert!(v.is_empty());
    /// ```
    pub fn try_emplace_with<T, U, E>(
        &mut self,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<&mut T, E>
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        let transition = Transition::begin(self);
        let value = f()?;
        Ok(transition.commit(value))
    }

    pub fn emplace_from_iter<T, U, I>(&mut self, iter: I) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
        I: IntoIterator,
        T: FromIterator<I::Item>,
    {
        self.emplace_with::<T, U>(|| iter.into_iter().collect())
    }

    pub fn emplace_from_iter_at<U, T, I>(&mut self, iter: I) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
        I: IntoIterator,
        T: FromIterator<I::Item>,
    {
        self.emplace_from_iter::<T, U, I>(iter)
    }

    /// Assign a bare value. If `T` is already active the value is assigned in
    /// place, otherwise it is emplaced.
    pub fn assign_value<T, U>(&mut self, value: T) -> &mut T
    where
        S: Split<T, U>,
        U: Ordinal,
    {
        if self.tag == U::VALUE {
            let slot = unsafe { self.storage.get_mut::<T, U>() };
            *slot = value;
            slot
        } else {
            self.emplace::<T, U>(value)
        }
    }

    /// Move-assign from another variant, consuming it.
    ///
    /// A valueless source leaves this variant valueless too.
    pub fn assign(&mut self, source: Self) {
        let mut source = ManuallyDrop::new(source);
        if source.is_empty() {
            self.reset();
        } else if self.tag == source.tag {
            unsafe {
                self.storage.swap_active(&mut source.storage, self.tag);
                source.storage.destroy_active(self.tag);
            }
        } else {
            let transition = Transition::begin(self);
            unsafe {
                transition.variant.storage = source.storage.duplicate();
                transition.commit_tag(source.tag);
            }
        }
    }

    /// Move-assign from another variant, leaving the source valueless.
    pub fn move_from(&mut self, source: &mut Self) {
        self.assign(source.take());
    }

    /// Copy `source` as one flat block, without dispatching on either tag.
    pub fn copy_from(&mut self, source: &Self)
    where
        S: AltCopy,
    {
        log::trace!("flat copy of a variant with tag {}", source.tag);
        self.tag = source.tag;
        self.storage = unsafe { source.storage.duplicate() };
    }

    /// Swap the values of two variants.
    ///
    /// Values of the same alternative are swapped in place. A valueless side
    /// receives the other side's value, which becomes valueless.
    pub fn swap(&mut self, other: &mut Self) {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => {}
            (false, true) => other.move_from(self),
            (true, false) => self.move_from(other),
            (false, false) if self.tag == other.tag => unsafe {
                self.storage.swap_active(&mut other.storage, self.tag)
            },
            (false, false) => {
                let mut temp = self.take();
                self.move_from(other);
                other.move_from(&mut temp);
            }
        }
    }
}

impl<S: NonEmpty + AltClone> Clone for Variant<S> {
    fn clone(&self) -> Self {
        let mut ret = Variant {
            tag: NPOS,
            storage: Storage::uninit(),
        };
        if !self.is_empty() {
            unsafe {
                <S as AltClone>::clone_into(self.storage.as_ptr(), ret.storage.as_mut_ptr(), self.tag)
            };
            ret.tag = self.tag;
        }
        ret
    }

    /// Copy-assign from `source`.
    ///
    /// If both sides hold the same alternative it is assigned in place with
    /// its own `clone_from`; a panic there drops the half-assigned value and
    /// leaves this variant valueless. Otherwise the old value is dropped
    /// before the clone, which leaves this variant valueless if it panics.
    fn clone_from(&mut self, source: &Self) {
        if source.is_empty() {
            self.reset();
        } else if self.tag == source.tag {
            let transition = Transition::in_place(self);
            unsafe {
                <S as AltClone>::clone_from(
                    transition.variant.storage.as_mut_ptr(),
                    source.storage.as_ptr(),
                    source.tag,
                );
                transition.commit_tag(source.tag);
            }
        } else {
            let transition = Transition::begin(self);
            unsafe {
                <S as AltClone>::clone_into(
                    source.storage.as_ptr(),
                    transition.variant.storage.as_mut_ptr(),
                    source.tag,
                );
                transition.commit_tag(source.tag);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        panic::{self, AssertUnwindSafe},
        rc::Rc,
        string::{String, ToString},
        vec,
        vec::Vec,
    };

    use super::*;
    use crate::tag::*;

    /// Counts its drops in a shared cell. Cloning in place panics.
    #[derive(Debug)]
    struct Tracked(Rc<Cell<usize>>);

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            Tracked(self.0.clone())
        }

        fn clone_from(&mut self, _: &Self) {
            panic!("clone_from of Tracked")
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Panics whenever it is cloned into or from.
    #[derive(Debug, PartialEq)]
    struct Brittle(u32);

    impl Clone for Brittle {
        fn clone(&self) -> Self {
            panic!("clone of Brittle")
        }

        fn clone_from(&mut self, _: &Self) {
            panic!("clone_from of Brittle")
        }
    }

    #[test]
    fn emplace_replaces_and_drops_once() {
        let drops = Rc::new(Cell::new(0));
        let mut v = <Variant![i32, Tracked]>::default();

        v.emplace(Tracked(drops.clone()));
        assert_eq!(v.tag(), 1);
        assert_eq!(drops.get(), 0);

        v.emplace_at::<U0, _>(5);
        assert_eq!(drops.get(), 1);
        assert_eq!(v.get::<i32, _>(), Ok(&5));

        drop(v);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn try_emplace_failure_leaves_valueless() {
        let drops = Rc::new(Cell::new(0));
        let mut v = <Variant![Tracked, u32]>::new(Tracked(drops.clone()));

        let res = v.try_emplace_with::<u32, _, _>(|| "x".parse::<u32>());
        assert!(res.is_err());
        assert!(v.is_empty());
        assert_eq!(drops.get(), 1);

        let value = v.try_emplace_with::<u32, _, ()>(|| Ok(3)).unwrap();
        *value += 1;
        assert_eq!(v.get_at::<U1, _>(), Ok(&4));
    }

    #[test]
    fn emplace_with_panic_leaves_valueless() {
        let mut v = <Variant![String, u32]>::new(7u32);
        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            v.emplace_with::<String, _>(|| panic!("constructor"));
        }));
        assert!(res.is_err());
        assert!(v.is_empty());
        assert!(v.get::<u32, _>().unwrap_err().is_valueless());
    }

    #[test]
    fn emplace_from_iter() {
        let mut v = <Variant![u8, Vec<u8>, String]>::default();
        v.emplace_from_iter::<String, _, _>(['a', 'b']);
        assert_eq!(v.get_at::<U2, _>().map(String::as_str), Ok("ab"));

        v.emplace_from_iter_at::<U1, _, _>([1u8, 2]).push(3);
        assert_eq!(v.get::<Vec<u8>, _>(), Ok(&vec![1, 2, 3]));
    }

    #[test]
    fn assign_value_in_place_and_across() {
        let mut v = <Variant![i32, String]>::new("a".to_string());
        let slot: *const String = v.get::<String, _>().unwrap();
        v.assign_value("b".to_string());
        assert!(core::ptr::eq(slot, v.get::<String, _>().unwrap()));
        assert_eq!(v.get::<String, _>().unwrap(), "b");

        v.assign_value(5);
        assert_eq!(v.get::<i32, _>(), Ok(&5));

        v.reset();
        v.assign_value(6);
        assert_eq!(v.get::<i32, _>(), Ok(&6));
    }

    #[test]
    fn move_assignment() {
        let drops = Rc::new(Cell::new(0));
        let mut a = <Variant![Tracked, u8]>::new(Tracked(drops.clone()));
        let b = <Variant![Tracked, u8]>::new(Tracked(drops.clone()));

        a.assign(b);
        assert_eq!(drops.get(), 1, "the old value is dropped, the new one kept");
        assert_eq!(a.tag(), 0);

        a.assign(Variant::new(9u8));
        assert_eq!(drops.get(), 2);
        assert_eq!(a.get::<u8, _>(), Ok(&9));

        let mut empty = a.take();
        assert!(a.is_empty());
        empty.reset();
        let mut c = <Variant![Tracked, u8]>::new(1u8);
        c.assign(empty);
        assert!(c.is_empty());
    }

    #[test]
    fn move_from_empties_the_source() {
        let mut a = <Variant![u8, String]>::new(1u8);
        let mut b = <Variant![u8, String]>::new("moved".to_string());
        a.move_from(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.get::<String, _>().unwrap(), "moved");
    }

    #[test]
    fn clone_and_clone_from() {
        let a = <Variant![u8, String]>::new("text".to_string());
        let mut b = a.clone();
        assert_eq!(a, b);

        b.clone_from(&<Variant![u8, String]>::new(3u8));
        assert_eq!(b.get::<u8, _>(), Ok(&3));

        b.clone_from(&a);
        assert_eq!(a, b);

        let mut empty = a.clone();
        empty.reset();
        assert!(empty.clone().is_empty());
        b.clone_from(&empty);
        assert!(b.is_empty());
    }

    #[test]
    fn failed_in_place_clone_from_drops_and_empties() {
        let (target, source) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
        let mut a = <Variant![Tracked, u8]>::new(Tracked(target.clone()));
        let b = <Variant![Tracked, u8]>::new(Tracked(source.clone()));

        let res = panic::catch_unwind(AssertUnwindSafe(|| a.clone_from(&b)));
        assert!(res.is_err());
        assert!(a.is_empty());
        assert_eq!(target.get(), 1, "the half-assigned value is dropped once");
        assert_eq!(source.get(), 0);

        drop(a);
        assert_eq!(target.get(), 1);
        drop(b);
        assert_eq!(source.get(), 1);
    }

    #[test]
    fn same_alternative_assign_drops_old_once() {
        let (old, new) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
        let mut a = <Variant![Tracked, u8]>::new(Tracked(old.clone()));

        a.assign(Variant::new(Tracked(new.clone())));
        assert_eq!((old.get(), new.get()), (1, 0));
        assert_eq!(a.tag(), 0);

        drop(a);
        assert_eq!((old.get(), new.get()), (1, 1));
    }

    #[test]
    fn failed_cross_clone_from_empties() {
        let mut a = <Variant![Brittle, u8]>::new(4u8);
        let b = <Variant![Brittle, u8]>::new(Brittle(2));
        let res = panic::catch_unwind(AssertUnwindSafe(|| a.clone_from(&b)));
        assert!(res.is_err());
        assert!(a.is_empty());
        assert_eq!(b.get::<Brittle, _>(), Ok(&Brittle(2)));
    }

    #[test]
    fn flat_copy() {
        let mut a = <Variant![u8, (u64, u64)]>::new(1u8);
        let b = <Variant![u8, (u64, u64)]>::new((2u64, 3u64));
        a.copy_from(&b);
        assert_eq!(a.get::<(u64, u64), _>(), Ok(&(2, 3)));
    }

    #[test]
    fn swap_cases() {
        type V = Variant![i32, String];

        let mut a = V::new(1);
        let mut b = V::new(2);
        a.swap(&mut b);
        assert_eq!((a.get::<i32, _>(), b.get::<i32, _>()), (Ok(&2), Ok(&1)));

        let mut c = V::new("c".to_string());
        a.swap(&mut c);
        assert_eq!(a.tag(), 1);
        assert_eq!(c.tag(), 0);
        assert_eq!(a.get::<String, _>().unwrap(), "c");
        assert_eq!(c.get::<i32, _>(), Ok(&2));

        let mut e = V::new(0);
        e.reset();
        a.swap(&mut e);
        assert!(a.is_empty());
        assert_eq!(e.get::<String, _>().unwrap(), "c");

        e.swap(&mut a);
        assert!(e.is_empty());
        assert_eq!(a.get::<String, _>().unwrap(), "c");

        let mut p = V::new(0);
        p.reset();
        e.swap(&mut p);
        assert!(e.is_empty());
        assert!(p.is_empty());
    }
}
