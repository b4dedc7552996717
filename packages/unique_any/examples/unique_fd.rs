//! Owning file-descriptor-like resources with `UniqueAny`.
//!
//! A tiny in-process "descriptor table" stands in for the operating system so the example runs
//! the same on every platform.

use std::cell::RefCell;

use unique_any::{Deleter, NonNegative, UniqueAny};

thread_local! {
    static OPEN: RefCell<Vec<i32>> = const { RefCell::new(Vec::new()) };
}

fn open(path: &str) -> i32 {
    if path.is_empty() {
        return -1;
    }

    OPEN.with_borrow_mut(|open| {
        let fd = open.last().map_or(3, |last| last.wrapping_add(1));
        open.push(fd);
        println!("open({path:?}) = {fd}");
        fd
    })
}

#[derive(Debug, Default)]
struct Close;

impl Deleter<i32> for Close {
    fn delete(&mut self, fd: &mut i32) {
        let fd = *fd;

        OPEN.with_borrow_mut(|open| open.retain(|&candidate| candidate != fd));
        println!("close({fd})");
    }
}

type UniqueFd = UniqueAny<i32, Close, NonNegative>;

fn open_descriptors() -> usize {
    OPEN.with_borrow(Vec::len)
}

fn main() {
    let config = UniqueFd::new(open("/etc/app.toml"));
    let mut log = UniqueFd::new(open("/var/log/app.log"));
    assert_eq!(open_descriptors(), 2);

    // A failed open yields an empty handle that never closes anything.
    let missing = UniqueFd::new(open(""));
    assert!(missing.is_empty());
    assert!(missing == -1);

    // Ownership moves with the handle.
    let kept = config;
    println!("kept descriptor {}", *kept);

    // Handing a descriptor to someone else means it is no longer ours to close.
    let raw = log.disown().expect("log was opened successfully");
    println!("handed off descriptor {raw}");

    drop(log);
    drop(missing);
    drop(kept);

    // Only the handed-off descriptor is still open.
    assert_eq!(open_descriptors(), 1);
    println!("unique_fd example completed successfully!");
}
