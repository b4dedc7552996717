use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use crate::{Boxed, Element};

/// The cleanup action of a [`UniqueAny`][crate::UniqueAny].
///
/// The handle calls [`delete()`][Self::delete] exactly once for every valid value it acquired,
/// with the value still in place, right before the value is discarded.
///
/// Implement this trait directly on a (typically zero-sized) type to get a deleter that can be
/// named in type aliases. Closures and functions are turned into deleters automatically via
/// [`IntoDeleter`].
///
/// # Example
///
/// ```
/// use unique_any::{Deleter, NonNegative, UniqueAny};
///
/// #[derive(Default)]
/// struct CloseFd;
///
/// impl Deleter<i32> for CloseFd {
///     fn delete(&mut self, fd: &mut i32) {
///         println!("closing descriptor {fd}");
///     }
/// }
///
/// type UniqueFd = UniqueAny<i32, CloseFd, NonNegative>;
///
/// let fd = UniqueFd::new(3);
/// assert!(fd.is_valid());
/// ```
pub trait Deleter<T> {
    /// Releases the resource denoted by `value`.
    ///
    /// The handle discards the value itself afterwards; the deleter must not attempt to
    /// replace or reuse it.
    fn delete(&mut self, value: &mut T);
}

/// Conversion of a callable into a [`Deleter`] for elements of type `T`, using the calling
/// convention `C`.
///
/// The calling convention is resolved at compile time from the signature of the callable:
///
/// | Callable signature | Element | Convention |
/// |---|---|---|
/// | `FnMut(T)` | any `T: Copy` (pointers, descriptors) | [`ByValue`] |
/// | `FnMut(&mut T)` | boxed (non-pointer) elements | [`ByRef`] |
/// | `FnMut(*mut T)` | any | [`ByAddress`] |
/// | `FnMut(*mut U)` | `*const U` | [`CastMut`] |
/// | implements [`Deleter<T>`] | any | [`Implemented`] |
///
/// The signatures are disjoint, so at most one convention applies. A callable that matches none
/// of them is rejected by the compiler when the handle is constructed.
pub trait IntoDeleter<T, C> {
    /// The deleter produced by the conversion.
    type Deleter: Deleter<T>;

    /// Performs the conversion.
    fn into_deleter(self) -> Self::Deleter;
}

/// Calling convention: the callable receives a copy of the value.
#[derive(Debug)]
#[non_exhaustive]
pub struct ByValue;

/// Calling convention: the callable receives an exclusive reference to the payload.
///
/// Only available for elements with [`Boxed`] storage; a pointer has no payload to refer to.
#[derive(Debug)]
#[non_exhaustive]
pub struct ByRef;

/// Calling convention: the callable receives the address of the stored value.
///
/// This supports the `cleanup(&resource)` idiom of many C APIs, where the cleanup function may
/// also overwrite the value it was given (e.g. setting it to null).
#[derive(Debug)]
#[non_exhaustive]
pub struct ByAddress;

/// Calling convention: the element is a `*const U` but the callable expects a `*mut U`.
///
/// The constness is removed only for the cleanup call. No other access path of the handle ever
/// exposes the pointer as mutable.
#[derive(Debug)]
#[non_exhaustive]
pub struct CastMut;

/// Calling convention: the type already implements [`Deleter<T>`] and is used as-is.
#[derive(Debug)]
#[non_exhaustive]
pub struct Implemented;

/// A deleter that invokes a closure or function using the calling convention `C`.
///
/// Created automatically by [`IntoDeleter`] when a handle is constructed from a callable.
pub struct FnDeleter<F, C> {
    f: F,

    _convention: PhantomData<fn() -> C>,
}

impl<F, C> FnDeleter<F, C> {
    const fn new(f: F) -> Self {
        Self {
            f,
            _convention: PhantomData,
        }
    }
}

impl<F, C> fmt::Debug for FnDeleter<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDeleter")
            .field("convention", &type_name::<C>())
            .finish_non_exhaustive()
    }
}

impl<T, F> Deleter<T> for FnDeleter<F, ByValue>
where
    T: Copy,
    F: FnMut(T),
{
    #[inline]
    fn delete(&mut self, value: &mut T) {
        (self.f)(*value);
    }
}

impl<T, F> Deleter<T> for FnDeleter<F, ByRef>
where
    T: Element<Storage = Boxed<T>>,
    F: FnMut(&mut T),
{
    #[inline]
    fn delete(&mut self, value: &mut T) {
        (self.f)(value);
    }
}

impl<T, F> Deleter<T> for FnDeleter<F, ByAddress>
where
    F: FnMut(*mut T),
{
    #[inline]
    fn delete(&mut self, value: &mut T) {
        (self.f)(ptr::from_mut(value));
    }
}

impl<U, F> Deleter<*const U> for FnDeleter<F, CastMut>
where
    F: FnMut(*mut U),
{
    #[inline]
    fn delete(&mut self, value: &mut *const U) {
        (self.f)(value.cast_mut());
    }
}

impl<T, D> IntoDeleter<T, Implemented> for D
where
    D: Deleter<T>,
{
    type Deleter = D;

    #[inline]
    fn into_deleter(self) -> D {
        self
    }
}

impl<T, F> IntoDeleter<T, ByValue> for F
where
    T: Copy,
    F: FnMut(T),
{
    type Deleter = FnDeleter<F, ByValue>;

    #[inline]
    fn into_deleter(self) -> Self::Deleter {
        FnDeleter::new(self)
    }
}

impl<T, F> IntoDeleter<T, ByRef> for F
where
    T: Element<Storage = Boxed<T>>,
    F: FnMut(&mut T),
{
    type Deleter = FnDeleter<F, ByRef>;

    #[inline]
    fn into_deleter(self) -> Self::Deleter {
        FnDeleter::new(self)
    }
}

impl<T, F> IntoDeleter<T, ByAddress> for F
where
    F: FnMut(*mut T),
{
    type Deleter = FnDeleter<F, ByAddress>;

    #[inline]
    fn into_deleter(self) -> Self::Deleter {
        FnDeleter::new(self)
    }
}

impl<U, F> IntoDeleter<*const U, CastMut> for F
where
    F: FnMut(*mut U),
{
    type Deleter = FnDeleter<F, CastMut>;

    #[inline]
    fn into_deleter(self) -> Self::Deleter {
        FnDeleter::new(self)
    }
}

/// A deleter of `*mut U` that can also serve as the deleter after the handle is promoted to
/// `*const U` via [`UniqueAny::into_const()`][crate::UniqueAny::into_const].
pub trait ConstDeleter<U>: Deleter<*mut U> {
    /// The deleter used by the promoted `*const U` handle.
    type Const: Deleter<*const U>;

    /// Converts this deleter into the deleter of the promoted handle.
    fn into_const(self) -> Self::Const;
}

impl<U, F> ConstDeleter<U> for FnDeleter<F, ByValue>
where
    F: FnMut(*mut U),
{
    type Const = FnDeleter<F, CastMut>;

    #[inline]
    fn into_const(self) -> Self::Const {
        FnDeleter::new(self.f)
    }
}

/// Deletes heap objects that were allocated via [`Box`].
///
/// This is the default deleter of [`UniquePtr`][crate::UniquePtr].
#[derive(Debug)]
#[non_exhaustive]
pub struct DropBox;

impl DropBox {
    /// Creates the deleter.
    ///
    /// # Safety
    ///
    /// Every pointer that a handle using this deleter considers valid must have been obtained
    /// from [`Box::into_raw()`] with the element's pointee type and must not be freed by anything
    /// other than the handle.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self
    }
}

impl<U> Deleter<*mut U> for DropBox {
    #[inline]
    fn delete(&mut self, value: &mut *mut U) {
        // SAFETY: The creator of the `DropBox` guaranteed that the pointer came from
        // `Box::into_raw()` and the handle invokes the deleter at most once per value.
        drop(unsafe { Box::from_raw(*value) });
    }
}

impl<U> Deleter<*const U> for DropBox {
    #[inline]
    fn delete(&mut self, value: &mut *const U) {
        // SAFETY: The creator of the `DropBox` guaranteed that the pointer came from
        // `Box::into_raw()` and the handle invokes the deleter at most once per value.
        // Constness was only added by the handle, the allocation itself is mutable.
        drop(unsafe { Box::from_raw(value.cast_mut()) });
    }
}

impl<U> ConstDeleter<U> for DropBox {
    type Const = Self;

    #[inline]
    fn into_const(self) -> Self {
        self
    }
}
