use num_traits::Zero;

use crate::Nullable;

/// Decides whether a stored value denotes a live resource.
///
/// A [`UniqueAny`][crate::UniqueAny] only counts a value as held if the predicate accepts it.
/// Values rejected at construction time are discarded immediately and the deleter is never
/// invoked on them.
///
/// Predicates must be pure: the same value must always produce the same answer.
///
/// Any `Fn(&T) -> bool` is a predicate, as are the unit structs in this module.
///
/// # Example
///
/// ```
/// use unique_any::UniqueAny;
///
/// fn close(_fd: i32) {}
///
/// let fd = UniqueAny::with_parts(-1, close, |fd: &i32| *fd >= 0);
/// assert!(!fd.is_valid());
/// ```
pub trait Predicate<T> {
    /// Returns `true` if `value` denotes a live resource.
    fn test(&self, value: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    #[inline]
    fn test(&self, value: &T) -> bool {
        self(value)
    }
}

/// Accepts every value that is not the natural "no value" representation of its type.
///
/// This is the default predicate of pointer-like elements.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct NotNull;

impl<T: Nullable> Predicate<T> for NotNull {
    #[inline]
    fn test(&self, value: &T) -> bool {
        !value.is_null()
    }
}

/// Accepts every value.
///
/// This is the default predicate of elements without a natural "no value" representation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct AlwaysValid;

impl<T> Predicate<T> for AlwaysValid {
    #[inline]
    fn test(&self, _value: &T) -> bool {
        true
    }
}

/// Accepts values greater than or equal to zero.
///
/// Suitable for file descriptors and similar integer handles that use negative values to
/// signal "no resource".
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct NonNegative;

impl<T> Predicate<T> for NonNegative
where
    T: Zero + PartialOrd,
{
    #[inline]
    fn test(&self, value: &T) -> bool {
        *value >= T::zero()
    }
}

/// Accepts pointers that are neither null nor the all-bits-set address.
///
/// Some platform APIs use `(T*)-1` as an "invalid handle" value next to (or instead of) null.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct NotNullOrAllOnes;

impl<U> Predicate<*mut U> for NotNullOrAllOnes {
    #[inline]
    fn test(&self, value: &*mut U) -> bool {
        !value.is_null() && value.addr() != usize::MAX
    }
}

impl<U> Predicate<*const U> for NotNullOrAllOnes {
    #[inline]
    fn test(&self, value: &*const U) -> bool {
        !value.is_null() && value.addr() != usize::MAX
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::ptr;

    use super::*;

    #[test]
    fn not_null_rejects_only_null() {
        let mut value = 5_u8;

        assert!(!NotNull.test(&ptr::null_mut::<u8>()));
        assert!(!NotNull.test(&ptr::null::<u8>()));
        assert!(NotNull.test(&ptr::from_mut(&mut value)));
    }

    #[test]
    fn always_valid_accepts_everything() {
        assert!(AlwaysValid.test(&0_i32));
        assert!(AlwaysValid.test(&-1_i32));
        assert!(AlwaysValid.test(&ptr::null_mut::<u8>()));
    }

    #[test]
    fn non_negative_boundaries() {
        assert!(NonNegative.test(&0_i32));
        assert!(NonNegative.test(&i32::MAX));
        assert!(!NonNegative.test(&-1_i32));
        assert!(!NonNegative.test(&i64::MIN));
        assert!(NonNegative.test(&0_u32));
    }

    #[test]
    fn not_null_or_all_ones_rejects_both_sentinels() {
        let mut value = 5_u8;

        assert!(!NotNullOrAllOnes.test(&ptr::null_mut::<u8>()));
        assert!(!NotNullOrAllOnes.test(&ptr::without_provenance_mut::<u8>(usize::MAX)));
        assert!(!NotNullOrAllOnes.test(&ptr::without_provenance::<u8>(usize::MAX)));
        assert!(NotNullOrAllOnes.test(&ptr::from_mut(&mut value)));
    }

    #[test]
    fn closures_are_predicates() {
        let is_small = |value: &u32| *value < 10;

        assert!(is_small.test(&4));
        assert!(!is_small.test(&50));
    }
}
