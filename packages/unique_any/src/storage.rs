use std::mem;

use crate::{Nullable, Sealed};

/// Determines how a [`UniqueAny`][crate::UniqueAny] physically holds its value and how it knows
/// whether a value is present at all.
///
/// There are exactly two implementations, selected by the element type via
/// [`Element::Storage`][crate::Element::Storage]:
///
/// * [`Direct<T>`] stores the bare value and uses the natural empty representation of the type
///   (e.g. a null pointer). It adds no size overhead.
/// * [`Boxed<T>`] stores an explicit presence flag next to the payload, for types that have no
///   natural empty representation.
///
/// This trait is sealed and can only be implemented in the `unique_any` crate.
#[expect(private_bounds, reason = "intentionally sealed trait")]
pub trait Storage<T>: StoragePrivate<T> + Sealed {
    /// The arrow-style view of a held value: the value itself for pointer-like elements, an
    /// exclusive reference to the payload for everything else.
    type Member<'a>
    where
        Self: 'a;

    /// Returns the arrow-style view of the value, or `None` if no value is present.
    fn member(&mut self) -> Option<Self::Member<'_>>;
}

/// Storage operations used by the ownership core. Not part of the public API.
pub(crate) trait StoragePrivate<T> {
    /// Creates storage that holds no value.
    fn empty() -> Self;

    /// Places `value` into the storage. Any previous value must already have been reset.
    fn emplace(&mut self, value: T);

    /// Builds the value directly in the storage. Any previous value must already have been reset.
    fn emplace_with<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        self.emplace(f());
    }

    /// Whether a value is physically present. This ignores any validity predicate.
    fn has_value(&self) -> bool;

    fn value(&self) -> Option<&T>;

    /// Moves the value out, leaving the storage empty.
    fn take(&mut self) -> Option<T>;

    /// Discards the value (if any), leaving the storage empty.
    fn reset(&mut self);
}

/// Storage for types with a natural empty representation, such as raw pointers.
///
/// The value is stored as-is and a value equal to [`Nullable::null()`] means "no value".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Direct<T>(T);

impl<T: Nullable> Sealed for Direct<T> {}

impl<T: Nullable> Storage<T> for Direct<T> {
    type Member<'a>
        = T
    where
        Self: 'a;

    #[inline]
    fn member(&mut self) -> Option<T> {
        self.value().copied()
    }
}

impl<T: Nullable> StoragePrivate<T> for Direct<T> {
    #[inline]
    fn empty() -> Self {
        Self(T::null())
    }

    #[inline]
    fn emplace(&mut self, value: T) {
        self.0 = value;
    }

    #[inline]
    fn has_value(&self) -> bool {
        !self.0.is_null()
    }

    #[inline]
    fn value(&self) -> Option<&T> {
        self.has_value().then_some(&self.0)
    }

    #[inline]
    fn take(&mut self) -> Option<T> {
        let value = mem::replace(&mut self.0, T::null());
        (!value.is_null()).then_some(value)
    }

    #[inline]
    fn reset(&mut self) {
        self.0 = T::null();
    }
}

/// Storage for types without a natural empty representation, such as integers or structs.
///
/// Presence is tracked explicitly and storage starts out empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Boxed<T>(Option<T>);

impl<T> Sealed for Boxed<T> {}

impl<T> Storage<T> for Boxed<T> {
    type Member<'a>
        = &'a mut T
    where
        Self: 'a;

    #[inline]
    fn member(&mut self) -> Option<&mut T> {
        self.0.as_mut()
    }
}

impl<T> StoragePrivate<T> for Boxed<T> {
    #[inline]
    fn empty() -> Self {
        Self(None)
    }

    #[inline]
    fn emplace(&mut self, value: T) {
        debug_assert!(self.0.is_none(), "storage must be reset before emplacing a new value");

        self.0 = Some(value);
    }

    #[inline]
    fn emplace_with<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        debug_assert!(self.0.is_none(), "storage must be reset before emplacing a new value");

        self.0.get_or_insert_with(f);
    }

    #[inline]
    fn has_value(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    #[inline]
    fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    #[inline]
    fn reset(&mut self) {
        self.0 = None;
    }
}
