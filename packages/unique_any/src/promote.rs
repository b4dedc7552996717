use crate::{ConstDeleter, Predicate, UniqueAny};

impl<U, D, P> UniqueAny<*mut U, D, P>
where
    D: ConstDeleter<U>,
    P: Predicate<*mut U> + Predicate<*const U>,
{
    /// Transfers ownership to a handle that only exposes the pointee as read-only.
    ///
    /// No cleanup happens during the transfer. The promoted handle releases the resource using
    /// the same deleter, which still receives a `*mut U` if that is what it was written for.
    ///
    /// There is no conversion in the opposite direction.
    ///
    /// # Example
    ///
    /// ```
    /// use unique_any::{DropBox, UniqueAny, UniquePtr};
    ///
    /// let raw = Box::into_raw(Box::new(String::from("config")));
    ///
    /// // SAFETY: The handle only ever holds the pointer obtained from `Box::into_raw()` above.
    /// let owned: UniquePtr<String> = UniqueAny::with_deleter(raw, unsafe { DropBox::new() });
    ///
    /// let shared = owned.into_const();
    /// assert!(shared.is_valid());
    /// ```
    #[must_use]
    pub fn into_const(self) -> UniqueAny<*const U, D::Const, P> {
        let (value, deleter, predicate) = self.into_parts();

        let mut promoted =
            UniqueAny::<*const U, D::Const, P>::from_parts(deleter.into_const(), predicate);

        if let Some(value) = value {
            promoted.reset_to(value.cast_const());
        }

        promoted
    }
}

impl<U, D, P> From<UniqueAny<*mut U, D, P>> for UniqueAny<*const U, D::Const, P>
where
    D: ConstDeleter<U>,
    P: Predicate<*mut U> + Predicate<*const U>,
{
    fn from(value: UniqueAny<*mut U, D, P>) -> Self {
        value.into_const()
    }
}
