//! Lifecycle scenarios exercised through the public API only.

use std::cell::{Cell, RefCell};
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::rc::Rc;

use unique_any::{
    Deleter, DropBox, Error, NonNegative, NotNull, UniqueAny, UniquePtr, boxed_element,
};

/// Records every descriptor it closes.
#[derive(Clone, Debug, Default)]
struct Recorder {
    closed: Rc<RefCell<Vec<i32>>>,
}

impl Recorder {
    fn closed(&self) -> Vec<i32> {
        self.closed.borrow().clone()
    }
}

impl Deleter<i32> for Recorder {
    fn delete(&mut self, value: &mut i32) {
        self.closed.borrow_mut().push(*value);
    }
}

type UniqueFd = UniqueAny<i32, Recorder, NonNegative>;

fn descriptor(value: i32, recorder: &Recorder) -> UniqueFd {
    UniqueFd::with_parts(value, recorder.clone(), NonNegative)
}

/// Counts how many times it was dropped.
struct Tracked {
    drops: Rc<Cell<usize>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn heap_pointer(drops: &Rc<Cell<usize>>) -> UniquePtr<Tracked> {
    let raw = Box::into_raw(Box::new(Tracked {
        drops: Rc::clone(drops),
    }));

    // SAFETY: The handle only ever holds the pointer obtained from `Box::into_raw()` above.
    UniqueAny::with_deleter(raw, unsafe { DropBox::new() })
}

#[test]
fn valid_descriptor_closed_once() {
    let recorder = Recorder::default();

    let fd = descriptor(5, &recorder);
    assert!(fd.is_valid());

    drop(fd);
    assert_eq!(recorder.closed(), vec![5]);
}

#[test]
fn rejected_descriptors_never_closed() {
    let recorder = Recorder::default();

    for value in [-1, -2, i32::MIN] {
        let fd = descriptor(value, &recorder);
        assert!(fd.is_empty());
    }

    assert!(recorder.closed().is_empty());
}

#[test]
fn move_chain_closes_once() {
    let recorder = Recorder::default();

    let h1 = descriptor(17, &recorder);
    let h2 = h1;
    let h3 = h2;
    assert!(recorder.closed().is_empty());

    drop(h3);
    assert_eq!(recorder.closed(), vec![17]);
}

#[test]
fn moving_into_vacated_binding_closes_nothing() {
    let recorder = Recorder::default();

    let mut a = descriptor(1, &recorder);
    let taken = mem::replace(&mut a, UniqueFd::empty_with_parts(recorder.clone(), NonNegative));
    a = taken;

    assert!(recorder.closed().is_empty());
    assert_eq!(a.get().ok(), Some(&1));
}

#[test]
fn move_assignment_closes_destination_first() {
    let recorder = Recorder::default();

    let mut destination = descriptor(1, &recorder);
    let source = descriptor(2, &recorder);
    assert!(destination.is_valid());

    destination = source;
    assert_eq!(recorder.closed(), vec![1]);
    assert!(destination == 2);

    drop(destination);
    assert_eq!(recorder.closed(), vec![1, 2]);
}

#[test]
fn disown_transfers_cleanup_to_caller() {
    let recorder = Recorder::default();
    let mut manually_closed = Vec::new();

    let mut fd = descriptor(8, &recorder);
    let raw = fd.disown().expect("handle is holding");
    manually_closed.push(raw);

    drop(fd);

    assert!(recorder.closed().is_empty());
    assert_eq!(manually_closed, vec![8]);
}

#[test]
fn disown_of_empty_handle_fails() {
    let recorder = Recorder::default();

    let mut fd = descriptor(-1, &recorder);

    let error = fd.disown().expect_err("handle is empty");
    assert!(matches!(error, Error::Empty { operation: "disown" }));
    assert_eq!(error.to_string(), "cannot disown an empty handle");
}

#[test]
fn reset_to_closes_old_before_new_is_checked() {
    let recorder = Recorder::default();

    let mut fd = descriptor(3, &recorder);

    fd.reset_to(-7);
    assert_eq!(recorder.closed(), vec![3]);
    assert!(fd.is_empty());

    drop(fd);
    assert_eq!(recorder.closed(), vec![3]);
}

#[test]
fn swap_exchanges_without_cleanup() {
    let recorder = Recorder::default();

    let mut a = descriptor(1, &recorder);
    let mut b = descriptor(-1, &recorder);

    mem::swap(&mut a, &mut b);

    assert!(recorder.closed().is_empty());
    assert!(a.is_empty());
    assert!(b == 1);
}

#[test]
fn equality_treats_rejected_values_as_absent() {
    let recorder = Recorder::default();

    assert_eq!(descriptor(-1, &recorder), descriptor(-2, &recorder));
    assert_eq!(descriptor(4, &recorder), descriptor(4, &recorder));
    assert_ne!(descriptor(4, &recorder), descriptor(-4, &recorder));

    let empty = descriptor(-1, &recorder);
    assert!(empty == -1);
    assert!(empty == -100);
    assert!(empty != 0);
}

#[test]
fn ordering_puts_empty_first() {
    let recorder = Recorder::default();

    let mut handles = [
        descriptor(9, &recorder),
        descriptor(-1, &recorder),
        descriptor(2, &recorder),
    ];
    handles.sort();

    let order: Vec<_> = handles.iter().map(|fd| fd.get().ok().copied()).collect();
    assert_eq!(order, vec![None, Some(2), Some(9)]);
}

#[test]
fn heap_pointer_freed_once_after_move() {
    let drops = Rc::new(Cell::new(0));

    let a = heap_pointer(&drops);
    let b = a;

    drop(b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn heap_pointer_moved_out_leaves_empty_source() {
    let drops = Rc::new(Cell::new(0));

    let mut a = heap_pointer(&drops);

    // SAFETY: The replacement is empty and never receives a pointer.
    let b = mem::replace(&mut a, UniqueAny::empty_with_deleter(unsafe { DropBox::new() }));

    assert!(a.is_empty());
    assert!(a == ptr::null_mut());

    drop(b);
    assert_eq!(drops.get(), 1);

    drop(a);
    assert_eq!(drops.get(), 1);
}

#[test]
fn const_promotion_transfers_without_cleanup() {
    let drops = Rc::new(Cell::new(0));

    let owned = heap_pointer(&drops);
    let raw = owned.as_raw();

    let shared: UniqueAny<*const Tracked, DropBox, NotNull> = owned.into();
    assert_eq!(drops.get(), 0);
    assert_eq!(shared.as_raw(), raw.cast_const());

    drop(shared);
    assert_eq!(drops.get(), 1);
}

#[test]
fn boxed_payload_mutated_through_member() {
    struct Connection {
        id: u32,
        open: bool,
    }

    boxed_element!(Connection);

    let closed = Cell::new(None);

    let mut connection = UniqueAny::in_place_with_parts(
        || Connection { id: 1, open: true },
        |c: &mut Connection| closed.set(Some(c.id)),
        |c: &Connection| c.open,
    );

    connection.member().expect("handle is holding").id = 2;
    assert_eq!(connection.get().map(|c| c.id).ok(), Some(2));

    drop(connection);
    assert_eq!(closed.get(), Some(2));
}

#[test]
fn boxed_payload_cleaned_up_by_address() {
    struct Buffer {
        len: usize,
    }

    boxed_element!(Buffer);

    let seen = Cell::new(0);

    let buffer = UniqueAny::with_deleter(Buffer { len: 64 }, |b: *mut Buffer| {
        // SAFETY: The handle passes the address of its live payload.
        seen.set(unsafe { (*b).len });
    });

    drop(buffer);
    assert_eq!(seen.get(), 64);
}

#[test]
fn heap_pointer_with_panicking_drop_freed_once() {
    struct Fragile {
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Fragile {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
            assert_ne!(self.drops.get(), 1, "teardown failed");
        }
    }

    let drops = Rc::new(Cell::new(0));
    let raw = Box::into_raw(Box::new(Fragile {
        drops: Rc::clone(&drops),
    }));

    // SAFETY: The handle only ever holds the pointer obtained from `Box::into_raw()` above.
    let mut owned: UniquePtr<Fragile> = UniqueAny::with_deleter(raw, unsafe { DropBox::new() });

    let result = panic::catch_unwind(AssertUnwindSafe(|| owned.reset()));
    assert!(result.is_err());
    assert!(owned.is_empty());

    drop(owned);
    assert_eq!(drops.get(), 1);
}
