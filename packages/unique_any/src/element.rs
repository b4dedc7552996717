use crate::{Direct, NotNull, Predicate, Storage};

/// A type that can be owned by a [`UniqueAny`][crate::UniqueAny].
///
/// The element type decides how the handle stores it and which validity predicate applies by
/// default:
///
/// * Pointer-like types have a natural empty representation and use [`Direct`] storage with the
///   [`NotNull`] predicate.
/// * Everything else uses [`Boxed`][crate::Boxed] storage with the
///   [`AlwaysValid`][crate::AlwaysValid] predicate.
///
/// Raw pointers, primitive integers, `bool` and `char` are elements out of the box. Use
/// [`boxed_element!`][crate::boxed_element] or [`direct_element!`][crate::direct_element] to make
/// your own types elements, or implement the trait manually to pick a different default
/// predicate.
///
/// # Example
///
/// ```
/// use unique_any::{Boxed, Element, Predicate, UniqueAny};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Descriptor(i32);
///
/// #[derive(Default)]
/// struct IsOpen;
///
/// impl Predicate<Descriptor> for IsOpen {
///     fn test(&self, value: &Descriptor) -> bool {
///         value.0 >= 0
///     }
/// }
///
/// impl Element for Descriptor {
///     type Storage = Boxed<Self>;
///     type Validity = IsOpen;
/// }
///
/// let closed = UniqueAny::with_deleter(Descriptor(-1), |_descriptor: Descriptor| {});
/// assert!(!closed.is_valid());
/// ```
pub trait Element: Sized {
    /// How a handle physically holds a value of this type.
    type Storage: Storage<Self>;

    /// The validity predicate used when the handle type does not name one explicitly.
    type Validity: Predicate<Self> + Default;
}

/// A type with a natural "no value" representation, such as a null pointer.
///
/// Elements that implement this trait can use [`Direct`] storage, which has no size overhead.
pub trait Nullable: Copy {
    /// Returns the "no value" representation.
    fn null() -> Self;

    /// Whether this is the "no value" representation.
    fn is_null(&self) -> bool;
}

/// An element that is stored directly, relying on its natural "no value" representation.
///
/// Handles over pointer-like elements gain a [`Default`] implementation and the
/// output-parameter binders ([`UniqueAny::out_ptr()`][crate::UniqueAny::out_ptr] and
/// [`UniqueAny::inout_ptr()`][crate::UniqueAny::inout_ptr]).
///
/// This is implemented automatically for every [`Nullable`] element with [`Direct`] storage.
pub trait PointerLike: Nullable + Element<Storage = Direct<Self>> {}

impl<T> PointerLike for T where T: Nullable + Element<Storage = Direct<T>> {}

impl<U> Nullable for *mut U {
    #[inline]
    fn null() -> Self {
        std::ptr::null_mut()
    }

    #[inline]
    fn is_null(&self) -> bool {
        <*mut U>::is_null(*self)
    }
}

impl<U> Nullable for *const U {
    #[inline]
    fn null() -> Self {
        std::ptr::null()
    }

    #[inline]
    fn is_null(&self) -> bool {
        <*const U>::is_null(*self)
    }
}

impl<U> Element for *mut U {
    type Storage = Direct<Self>;
    type Validity = NotNull;
}

impl<U> Element for *const U {
    type Storage = Direct<Self>;
    type Validity = NotNull;
}

/// Implements [`Element`] for one or more types using [`Boxed`][crate::Boxed] storage and the
/// [`AlwaysValid`][crate::AlwaysValid] default predicate.
///
/// # Example
///
/// ```
/// use unique_any::{UniqueAny, boxed_element};
///
/// struct Session {
///     id: u64,
/// }
///
/// boxed_element!(Session);
///
/// let session = UniqueAny::with_deleter(Session { id: 7 }, |session: &mut Session| {
///     println!("closing session {}", session.id);
/// });
///
/// assert!(session.is_valid());
/// ```
#[macro_export]
macro_rules! boxed_element {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Element for $ty {
                type Storage = $crate::Boxed<$ty>;
                type Validity = $crate::AlwaysValid;
            }
        )+
    };
}

/// Implements [`Element`] for one or more [`Nullable`] types using [`Direct`] storage and the
/// [`NotNull`] default predicate.
///
/// # Example
///
/// ```
/// use unique_any::{Nullable, UniqueAny, direct_element};
///
/// /// An opaque handle issued by a foreign library, with zero meaning "no object".
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct ObjectHandle(u64);
///
/// impl Nullable for ObjectHandle {
///     fn null() -> Self {
///         Self(0)
///     }
///
///     fn is_null(&self) -> bool {
///         self.0 == 0
///     }
/// }
///
/// direct_element!(ObjectHandle);
///
/// let handle = UniqueAny::with_deleter(ObjectHandle(3), |_handle: ObjectHandle| {});
/// assert!(handle.is_valid());
///
/// let empty = UniqueAny::with_deleter(ObjectHandle(0), |_handle: ObjectHandle| {});
/// assert!(!empty.is_valid());
/// ```
#[macro_export]
macro_rules! direct_element {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Element for $ty {
                type Storage = $crate::Direct<$ty>;
                type Validity = $crate::NotNull;
            }
        )+
    };
}

boxed_element!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char
);

// Lets handles compare against bare values (e.g. `handle == -1` or `handle == ptr::null_mut()`).
macro_rules! impl_eq_value {
    ($([$($generics:tt)*] $ty:ty),+ $(,)?) => {
        $(
            impl<$($generics)* D, P> PartialEq<$ty> for $crate::UniqueAny<$ty, D, P>
            where
                D: $crate::Deleter<$ty>,
                P: $crate::Predicate<$ty>,
            {
                #[inline]
                fn eq(&self, other: &$ty) -> bool {
                    self.eq_value(other)
                }
            }
        )+
    };
}

impl_eq_value!(
    [] i8, [] i16, [] i32, [] i64, [] i128, [] isize,
    [] u8, [] u16, [] u32, [] u64, [] u128, [] usize,
    [] bool, [] char,
    [U,] *mut U,
    [U,] *const U,
);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::any::TypeId;
    use std::ptr;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::Boxed;

    assert_impl_all!(*mut u8: PointerLike);
    assert_impl_all!(*const String: PointerLike);
    assert_not_impl_any!(i32: PointerLike);
    assert_not_impl_any!(usize: PointerLike);

    fn storage_of<T: Element + 'static>() -> TypeId
    where
        T::Storage: 'static,
    {
        TypeId::of::<T::Storage>()
    }

    #[test]
    fn pointers_use_direct_storage() {
        assert_eq!(storage_of::<*mut u8>(), TypeId::of::<Direct<*mut u8>>());
        assert_eq!(storage_of::<*const u8>(), TypeId::of::<Direct<*const u8>>());
    }

    #[test]
    fn primitives_use_boxed_storage() {
        assert_eq!(storage_of::<i32>(), TypeId::of::<Boxed<i32>>());
        assert_eq!(storage_of::<u64>(), TypeId::of::<Boxed<u64>>());
        assert_eq!(storage_of::<bool>(), TypeId::of::<Boxed<bool>>());
    }

    #[test]
    fn pointer_null_representation() {
        assert!(<*mut u8 as Nullable>::null().is_null());
        assert!(<*const u8 as Nullable>::null().is_null());

        let mut value = 1_u8;
        assert!(!Nullable::is_null(&ptr::from_mut(&mut value)));
    }
}
