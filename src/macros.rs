/// Constructs a [`struct@Variant`] type from a list of alternatives.
///
/// # Examples
///
/// ```rust
/// use tvariant::{Variant, tag::U1};
///
/// type Value = Variant![i32, u32, f64];
/// let v: Value = Variant::new(42u32);
/// assert_eq!(v.tag(), 1);
/// assert_eq!(v.get_at::<U1, _>(), Ok(&42));
/// ```
#[macro_export]
macro_rules! Variant {
    [$($t:ty),+ $(,)?] => [$crate::Variant::<$crate::T![$($t,)*]>];
}

/// Constructs an alternative list (heterogeneous list) type from a list of
/// types.
///
/// # Examples
///
/// ```rust
/// use tvariant::T;
///
/// type MyList = T![i32, u32, f64];
/// let list: MyList = (42i32, (42u32, (42.0f64, ())));
/// ```
#[macro_export]
macro_rules! T {
    [] => [()];
    [$head:ty $(, $t:ty)* $(,)?] => [($head, $crate::T!($($t,)*))];
}
