#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-owner handles for arbitrary resources: raw pointers, file descriptors, opaque structs
//! and platform handles, each paired with a cleanup action that runs at most once.
//!
//! [`UniqueAny<T, D, P>`][UniqueAny] generalizes the unique ownership of `Box` beyond heap
//! pointers and beyond the "null means nothing" convention:
//!
//! * The element type `T` decides how the value is stored. Pointer-like types are stored as-is
//!   and use their null representation as "empty", everything else carries an explicit presence
//!   flag (see [`Element`]).
//! * The deleter `D` releases the resource. Closures and functions are accepted in several
//!   calling conventions, resolved at compile time (see [`IntoDeleter`]).
//! * The predicate `P` decides which values denote live resources. Values it rejects never reach
//!   the deleter (see [`Predicate`]).
//!
//! Handles are move-only. Every acquired resource is released exactly once, by whichever handle
//! owns it when it is reset or dropped.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Example
//!
//! Owning a file descriptor, where negative values mean "no descriptor":
//!
//! ```
//! use unique_any::{Deleter, NonNegative, UniqueAny};
//!
//! #[derive(Default)]
//! struct Close;
//!
//! impl Deleter<i32> for Close {
//!     fn delete(&mut self, fd: &mut i32) {
//!         println!("close({fd})");
//!     }
//! }
//!
//! type UniqueFd = UniqueAny<i32, Close, NonNegative>;
//!
//! let mut fd = UniqueFd::new(3);
//! assert!(fd.is_valid());
//!
//! // Ownership moves with the handle; nothing is closed here.
//! let moved = fd;
//! assert_eq!(*moved, 3);
//!
//! // A rejected value produces an empty handle that never closes anything.
//! fd = UniqueFd::new(-1);
//! assert!(fd.is_empty());
//! assert!(fd == -1);
//! ```
//!
//! Binding a handle to the output parameter of a C-style constructor:
//!
//! ```
//! use unique_any::{UniqueAny, UniquePtr};
//!
//! fn widget_create(out: *mut *mut u64) -> i32 {
//!     // SAFETY: The caller passes a valid, writable slot.
//!     unsafe {
//!         out.write(Box::into_raw(Box::new(99)));
//!     }
//!
//!     0
//! }
//!
//! fn widget_destroy(widget: *mut u64) {
//!     // SAFETY: Only called with pointers from `widget_create()`.
//!     drop(unsafe { Box::from_raw(widget) });
//! }
//!
//! let mut widget: UniquePtr<u64, _> = UniqueAny::empty_with_deleter(widget_destroy);
//!
//! let status = widget.with_out_ptr(widget_create);
//!
//! assert_eq!(status, 0);
//! assert!(widget.is_valid());
//! ```

mod cleanup;
mod element;
mod error;
mod predicate;
mod promote;
mod storage;
mod unique_any;
mod unique_ptr;

pub use cleanup::*;
pub use element::*;
pub use error::*;
pub use predicate::*;
pub use storage::{Boxed, Direct, Storage};
pub(crate) use storage::StoragePrivate;
pub use unique_any::*;
pub use unique_ptr::*;

/// Prevents traits from being implemented outside this crate.
trait Sealed {}
