use std::any::type_name;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr;

use tracing::trace;

use crate::{
    Boxed, Deleter, Element, Error, IntoDeleter, Predicate, Result, Storage, StoragePrivate,
};

/// A single-owner handle to an arbitrary resource.
///
/// The handle pairs a value of type `T` (a raw pointer, a descriptor, an opaque struct, ...) with
/// a deleter `D` that releases the resource the value denotes. The deleter runs exactly once for
/// every valid value the handle acquires, when the handle is reset, reassigned or dropped,
/// regardless of how many times the handle was moved in between.
///
/// A handle is always in one of two states:
///
/// * **Holding** a value that the validity predicate `P` accepted.
/// * **Empty**, because it was created empty, because the predicate rejected its value or
///   because the value was reset or disowned.
///
/// The handle is move-only. There is no way to copy it and thereby release a resource twice.
///
/// # Example
///
/// ```
/// use unique_any::{NonNegative, UniqueAny};
///
/// fn close(fd: i32) {
///     println!("closing descriptor {fd}");
/// }
///
/// let mut fd = UniqueAny::with_parts(3, close, NonNegative);
/// assert!(fd.is_valid());
/// assert_eq!(*fd, 3);
///
/// // Closes descriptor 3 and takes ownership of descriptor 4.
/// fd.reset_to(4);
///
/// // Descriptor 4 is closed when the handle is dropped.
/// drop(fd);
/// ```
pub struct UniqueAny<T, D, P = <T as Element>::Validity>
where
    T: Element,
    D: Deleter<T>,
    P: Predicate<T>,
{
    storage: T::Storage,
    deleter: D,
    predicate: P,
}

impl<T, D, P> UniqueAny<T, D, P>
where
    T: Element,
    D: Deleter<T>,
    P: Predicate<T>,
{
    /// Takes ownership of `value` using a default-constructed deleter and predicate.
    ///
    /// This is the natural constructor for handle types that name a unit-struct deleter through
    /// a type alias.
    ///
    /// If the predicate rejects `value`, the handle is empty and the deleter is never invoked.
    #[must_use]
    pub fn new(value: T) -> Self
    where
        D: Default,
        P: Default,
    {
        let mut handle = Self::from_parts(D::default(), P::default());
        handle.storage.emplace(value);
        handle.adopt();
        handle
    }

    /// Takes ownership of `value`, using `deleter` to release it and `predicate` to decide
    /// whether it denotes a live resource.
    ///
    /// The deleter may be a closure or function with any of the calling conventions described
    /// in [`IntoDeleter`], or a type implementing [`Deleter<T>`] directly.
    ///
    /// If the predicate rejects `value`, the value is discarded, the handle is empty and the
    /// deleter is never invoked.
    #[must_use]
    pub fn with_parts<F, C>(value: T, deleter: F, predicate: P) -> Self
    where
        F: IntoDeleter<T, C, Deleter = D>,
    {
        let mut handle = Self::from_parts(deleter.into_deleter(), predicate);
        handle.storage.emplace(value);
        handle.adopt();
        handle
    }

    /// Creates an empty handle using a default-constructed deleter and predicate.
    #[must_use]
    pub fn empty() -> Self
    where
        D: Default,
        P: Default,
    {
        Self::from_parts(D::default(), P::default())
    }

    /// Creates an empty handle that will use `deleter` and `predicate` for values it acquires
    /// later via [`reset_to()`][Self::reset_to].
    #[must_use]
    pub fn empty_with_parts<F, C>(deleter: F, predicate: P) -> Self
    where
        F: IntoDeleter<T, C, Deleter = D>,
    {
        Self::from_parts(deleter.into_deleter(), predicate)
    }

    /// Releases the held resource, if any, leaving the handle empty.
    ///
    /// The deleter is invoked exactly once if the handle was holding a value. Resetting an empty
    /// handle does nothing.
    pub fn reset(&mut self) {
        // The handle is empty before the deleter runs, so an unwinding deleter cannot be
        // invoked a second time for the same value.
        let Some(mut value) = self.storage.take() else {
            return;
        };

        if self.predicate.test(&value) {
            trace!(element = type_name::<T>(), "invoking deleter");
            self.deleter.delete(&mut value);
        }
    }

    /// Releases the held resource, if any, and takes ownership of `value` instead.
    ///
    /// The predicate is evaluated for the new value. If it rejects the value, the handle ends up
    /// empty.
    pub fn reset_to(&mut self, value: T) {
        self.reset();
        self.storage.emplace(value);
        self.adopt();
    }

    /// Gives up ownership of the held value without releasing it.
    ///
    /// The deleter is not invoked and the handle becomes empty. The caller is now responsible for
    /// releasing the resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the handle is empty.
    pub fn disown(&mut self) -> Result<T> {
        if !self.is_valid() {
            return Err(Error::Empty {
                operation: "disown",
            });
        }

        let value = self.storage.take().ok_or(Error::Empty {
            operation: "disown",
        })?;

        trace!(element = type_name::<T>(), "disowned value");

        Ok(value)
    }

    /// Returns a shared reference to the held value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the handle is empty.
    pub fn get(&self) -> Result<&T> {
        self.value().ok_or(Error::Empty { operation: "get" })
    }

    /// Returns the arrow-style view of the held value.
    ///
    /// For pointer-like elements this is the pointer itself, ready to be passed to the foreign
    /// API that owns the pointee. For all other elements this is an exclusive reference to the
    /// payload, through which its fields can be accessed and modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the handle is empty.
    pub fn member(&mut self) -> Result<<T::Storage as Storage<T>>::Member<'_>> {
        if !self.is_valid() {
            return Err(Error::Empty { operation: "access" });
        }

        self.storage.member().ok_or(Error::Empty { operation: "access" })
    }

    /// Whether the handle is holding a value.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// Whether the handle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_valid()
    }

    /// Compares the handle against a bare value.
    ///
    /// A holding handle is equal to `other` if its value is. An empty handle is equal to every
    /// value that the predicate rejects, so an empty pointer handle is equal to a null pointer
    /// and an empty descriptor handle with the [`NonNegative`][crate::NonNegative] predicate is
    /// equal to `-1`.
    #[must_use]
    pub fn eq_value(&self, other: &T) -> bool
    where
        T: PartialEq,
    {
        match self.value() {
            Some(value) => value == other,
            None => !self.predicate.test(other),
        }
    }

    pub(crate) fn from_parts(deleter: D, predicate: P) -> Self {
        Self {
            storage: <T::Storage as StoragePrivate<T>>::empty(),
            deleter,
            predicate,
        }
    }

    /// The held value, if the handle is holding one.
    fn value(&self) -> Option<&T> {
        self.storage
            .value()
            .filter(|value| self.predicate.test(value))
    }

    /// Applies the predicate to a freshly emplaced value. A rejected value is discarded without
    /// invoking the deleter.
    fn adopt(&mut self) {
        let rejected = self
            .storage
            .value()
            .is_some_and(|value| !self.predicate.test(value));

        if rejected {
            trace!(
                element = type_name::<T>(),
                "value rejected by validity predicate"
            );
            self.storage.reset();
        }
    }

    /// Dismantles the handle without invoking the deleter, returning the held value (if any)
    /// together with the deleter and predicate.
    pub(crate) fn into_parts(self) -> (Option<T>, D, P) {
        let mut this = ManuallyDrop::new(self);

        let value = this.storage.take();

        // SAFETY: `this` is never used again and is never dropped, so each field is read exactly
        // once. The storage is empty after `take()`, so skipping its drop releases nothing.
        let deleter = unsafe { ptr::read(ptr::from_ref(&this.deleter)) };

        // SAFETY: As above.
        let predicate = unsafe { ptr::read(ptr::from_ref(&this.predicate)) };

        (value, deleter, predicate)
    }
}

impl<T, D> UniqueAny<T, D, T::Validity>
where
    T: Element,
    D: Deleter<T>,
{
    /// Takes ownership of `value`, using `deleter` to release it and the element's default
    /// predicate to decide whether it denotes a live resource.
    ///
    /// # Example
    ///
    /// ```
    /// use std::ptr;
    ///
    /// use unique_any::UniqueAny;
    ///
    /// let mut counter = 0_u32;
    ///
    /// let handle = UniqueAny::with_deleter(ptr::from_mut(&mut counter), |p: *mut u32| {
    ///     // SAFETY: The handle only passes the pointer it was given, which is still live.
    ///     unsafe {
    ///         *p += 1;
    ///     }
    /// });
    ///
    /// drop(handle);
    /// assert_eq!(counter, 1);
    /// ```
    #[must_use]
    pub fn with_deleter<F, C>(value: T, deleter: F) -> Self
    where
        F: IntoDeleter<T, C, Deleter = D>,
    {
        Self::with_parts::<F, C>(value, deleter, T::Validity::default())
    }

    /// Creates an empty handle that will use `deleter` for values it acquires later.
    #[must_use]
    pub fn empty_with_deleter<F, C>(deleter: F) -> Self
    where
        F: IntoDeleter<T, C, Deleter = D>,
    {
        Self::empty_with_parts::<F, C>(deleter, T::Validity::default())
    }
}

impl<T, D, P> UniqueAny<T, D, P>
where
    T: Element<Storage = Boxed<T>>,
    D: Deleter<T>,
    P: Predicate<T>,
{
    /// Builds the payload directly inside the handle, using a default-constructed deleter and
    /// predicate.
    ///
    /// Only available for elements with [`Boxed`] storage. If the predicate rejects the built
    /// payload, it is dropped and the deleter is never invoked.
    #[must_use]
    pub fn in_place<F>(f: F) -> Self
    where
        F: FnOnce() -> T,
        D: Default,
        P: Default,
    {
        let mut handle = Self::from_parts(D::default(), P::default());
        handle.storage.emplace_with(f);
        handle.adopt();
        handle
    }

    /// Builds the payload directly inside the handle.
    ///
    /// Only available for elements with [`Boxed`] storage. If the predicate rejects the built
    /// payload, it is dropped and the deleter is never invoked.
    #[must_use]
    pub fn in_place_with_parts<F, G, C>(f: F, deleter: G, predicate: P) -> Self
    where
        F: FnOnce() -> T,
        G: IntoDeleter<T, C, Deleter = D>,
    {
        let mut handle = Self::from_parts(deleter.into_deleter(), predicate);
        handle.storage.emplace_with(f);
        handle.adopt();
        handle
    }
}

impl<T, D, P> Deref for UniqueAny<T, D, P>
where
    T: Element,
    D: Deleter<T>,
    P: Predicate<T>,
{
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty. Use [`get()`][UniqueAny::get] for a fallible alternative.
    fn deref(&self) -> &T {
        match self.get() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T, D, P> Drop for UniqueAny<T, D, P>
where
    T: Element,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T, D, P> PartialEq for UniqueAny<T, D, P>
where
    T: Element + PartialEq,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<T, D, P> Eq for UniqueAny<T, D, P>
where
    T: Element + Eq,
    D: Deleter<T>,
    P: Predicate<T>,
{
}

impl<T, D, P> PartialOrd for UniqueAny<T, D, P>
where
    T: Element + PartialOrd,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value().partial_cmp(&other.value())
    }
}

impl<T, D, P> Ord for UniqueAny<T, D, P>
where
    T: Element + Ord,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl<T, D, P> Hash for UniqueAny<T, D, P>
where
    T: Element + Hash,
    D: Deleter<T>,
    P: Predicate<T>,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().hash(state);
    }
}

impl<T, D, P> fmt::Debug for UniqueAny<T, D, P>
where
    T: Element + fmt::Debug,
    D: Deleter<T>,
    P: Predicate<T>,
{
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueAny")
            .field("element", &type_name::<T>())
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}
