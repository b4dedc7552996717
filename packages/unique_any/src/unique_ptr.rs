use std::any::type_name;
use std::ffi::c_void;
use std::fmt;
use std::ptr;

use tracing::trace;

use crate::{Deleter, DropBox, NotNull, PointerLike, Predicate, UniqueAny};

/// A single-owner handle to a mutable raw pointer.
///
/// With the default [`DropBox`] deleter this owns a heap object allocated via [`Box`], much like
/// `Box<U>` itself but with an explicit empty state and interop helpers for foreign APIs. Name a
/// different deleter to own pointers allocated by a foreign library.
///
/// # Example
///
/// ```
/// use unique_any::{DropBox, UniqueAny, UniquePtr};
///
/// let raw = Box::into_raw(Box::new(42_u64));
///
/// // SAFETY: The handle only ever holds the pointer obtained from `Box::into_raw()` above.
/// let value: UniquePtr<u64> = UniqueAny::with_deleter(raw, unsafe { DropBox::new() });
///
/// assert_eq!(value.as_raw(), raw);
/// ```
pub type UniquePtr<U, D = DropBox, P = NotNull> = UniqueAny<*mut U, D, P>;

impl<T, D, P> Default for UniqueAny<T, D, P>
where
    T: PointerLike,
    D: Deleter<T> + Default,
    P: Predicate<T> + Default,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, D, P> UniqueAny<T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    /// Returns the held pointer without affecting ownership, or the null representation if the
    /// handle is empty.
    ///
    /// Use this to pass the resource to foreign functions that borrow it.
    #[must_use]
    pub fn as_raw(&self) -> T {
        self.get().copied().unwrap_or_else(|_| T::null())
    }

    /// Binds the handle to an output parameter of a foreign function that creates a resource.
    ///
    /// The held resource, if any, is released right away and the returned guard exposes a slot
    /// that starts out null. When the guard is dropped, the handle takes ownership of whatever the
    /// slot contains, subject to the validity predicate. A slot the foreign function never wrote
    /// leaves the handle empty.
    ///
    /// # Example
    ///
    /// ```
    /// use unique_any::{UniqueAny, UniquePtr};
    ///
    /// fn create(out: *mut *mut u32) {
    ///     // SAFETY: The caller passes a valid, writable slot.
    ///     unsafe {
    ///         out.write(Box::into_raw(Box::new(7)));
    ///     }
    /// }
    ///
    /// let mut handle: UniquePtr<u32, _> = UniqueAny::empty_with_deleter(|p: *mut u32| {
    ///     // SAFETY: `create()` allocated the pointer via `Box`.
    ///     drop(unsafe { Box::from_raw(p) });
    /// });
    ///
    /// create(handle.out_ptr().as_mut_ptr());
    /// assert!(handle.is_valid());
    /// ```
    pub fn out_ptr(&mut self) -> OutPtr<'_, T, D, P> {
        self.reset();

        OutPtr {
            handle: self,
            slot: T::null(),
        }
    }

    /// Binds the handle to an input-output parameter of a foreign function that may release the
    /// resource and replace it with a new one.
    ///
    /// The held value is disowned into the slot without invoking the deleter, so the foreign
    /// function takes over responsibility for it. When the guard is dropped, the handle takes
    /// ownership of whatever the slot contains, which may be the original value, a new value or
    /// the null representation.
    pub fn inout_ptr(&mut self) -> InOutPtr<'_, T, D, P> {
        let slot = self.disown().unwrap_or_else(|_| T::null());

        InOutPtr { handle: self, slot }
    }

    /// Calls `f` with an output parameter bound to the handle and returns its result.
    ///
    /// This is a scoped form of [`out_ptr()`][Self::out_ptr]: the handle adopts the slot as soon
    /// as `f` returns.
    pub fn with_out_ptr<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(*mut T) -> R,
    {
        let mut out = self.out_ptr();
        f(out.as_mut_ptr())
    }

    /// Calls `f` with an input-output parameter bound to the handle and returns its result.
    ///
    /// This is a scoped form of [`inout_ptr()`][Self::inout_ptr]: the handle adopts the slot as
    /// soon as `f` returns.
    pub fn with_inout_ptr<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(*mut T) -> R,
    {
        let mut inout = self.inout_ptr();
        f(inout.as_mut_ptr())
    }
}

/// Output parameter guard returned by [`UniqueAny::out_ptr()`].
///
/// The pointer returned by [`as_mut_ptr()`][Self::as_mut_ptr] is only valid while the guard is
/// alive and not moved.
#[must_use = "the handle only adopts the slot when the guard is dropped"]
pub struct OutPtr<'a, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    handle: &'a mut UniqueAny<T, D, P>,
    slot: T,
}

impl<T, D, P> OutPtr<'_, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    /// The address of the slot, to be passed to the foreign function.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        ptr::from_mut(&mut self.slot)
    }
}

impl<U, D, P> OutPtr<'_, *mut U, D, P>
where
    D: Deleter<*mut U>,
    P: Predicate<*mut U>,
{
    /// The address of the slot as an untyped `void**`, for foreign functions that allocate
    /// objects of several types through a single output parameter.
    #[must_use]
    pub fn as_void_ptr(&mut self) -> *mut *mut c_void {
        self.as_mut_ptr().cast()
    }
}

impl<T, D, P> Drop for OutPtr<'_, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn drop(&mut self) {
        trace!(element = type_name::<T>(), "adopting output parameter");

        // The handle was reset when the guard was created, so this releases nothing.
        self.handle.reset_to(self.slot);
    }
}

impl<T, D, P> fmt::Debug for OutPtr<'_, T, D, P>
where
    T: PointerLike + fmt::Debug,
    D: Deleter<T>,
    P: Predicate<T>,
{
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutPtr")
            .field("handle", &self.handle)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Input-output parameter guard returned by [`UniqueAny::inout_ptr()`].
///
/// The pointer returned by [`as_mut_ptr()`][Self::as_mut_ptr] is only valid while the guard is
/// alive and not moved.
#[must_use = "the handle only adopts the slot when the guard is dropped"]
pub struct InOutPtr<'a, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    handle: &'a mut UniqueAny<T, D, P>,
    slot: T,
}

impl<T, D, P> InOutPtr<'_, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    /// The address of the slot, pre-loaded with the previously held value.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        ptr::from_mut(&mut self.slot)
    }
}

impl<U, D, P> InOutPtr<'_, *mut U, D, P>
where
    D: Deleter<*mut U>,
    P: Predicate<*mut U>,
{
    /// The address of the slot as an untyped `void**`.
    #[must_use]
    pub fn as_void_ptr(&mut self) -> *mut *mut c_void {
        self.as_mut_ptr().cast()
    }
}

impl<T, D, P> Drop for InOutPtr<'_, T, D, P>
where
    T: PointerLike,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn drop(&mut self) {
        trace!(element = type_name::<T>(), "adopting input-output parameter");

        // The handle is empty at this point, so this releases nothing.
        self.handle.reset_to(self.slot);
    }
}

impl<T, D, P> fmt::Debug for InOutPtr<'_, T, D, P>
where
    T: PointerLike + fmt::Debug,
    D: Deleter<T>,
    P: Predicate<T>,
{
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InOutPtr")
            .field("handle", &self.handle)
            .field("slot", &self.slot)
            .finish()
    }
}
