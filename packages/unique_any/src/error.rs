use thiserror::Error;

/// Errors that can occur when accessing the resource owned by a [`UniqueAny`][crate::UniqueAny].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller attempted an operation that requires a held resource but the handle is empty.
    ///
    /// A handle is empty if it was created empty, if its value was rejected by the validity
    /// predicate, or if its value was reset or disowned.
    #[error("cannot {operation} an empty handle")]
    Empty {
        /// The operation that was attempted (e.g. `get` or `disown`).
        operation: &'static str,
    },
}

/// A specialized `Result` type for handle operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn empty_names_operation() {
        let error = Error::Empty { operation: "disown" };

        assert_eq!(error.to_string(), "cannot disown an empty handle");
    }
}
