//! In-process stand-in for the vendor library, used by unit tests.
//!
//! State is thread-local so tests running in parallel do not see each other.

use crate::native::EntryPoints;
use crate::types::{Point, POINT_SIZE};
use std::cell::RefCell;
use std::os::raw::{c_char, c_int};

#[derive(Clone, Debug)]
pub struct FakeCard {
    pub name: String,
    pub status: c_int,
    pub open: bool,
    pub accepts_open: bool,
}

impl FakeCard {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: 1,
            open: false,
            accepts_open: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteCall {
    pub card: c_int,
    pub bytes: c_int,
    pub pps: u16,
    pub reps: u16,
    pub points: Vec<Point>,
}

#[derive(Debug, Default)]
pub struct FakeVendor {
    pub card_count: Option<c_int>,
    pub cards: Vec<FakeCard>,
    pub writes: Vec<WriteCall>,
    pub stops: Vec<c_int>,
    pub name_buffer_len: Option<c_int>,
    pub close_calls: usize,
    pub close_result: bool,
}

thread_local! {
    static VENDOR: RefCell<FakeVendor> = RefCell::new(FakeVendor::default());
}

/// Resets the fake with the given cards and returns its entry points.
pub fn install(cards: Vec<FakeCard>) -> EntryPoints {
    VENDOR.with(|v| {
        *v.borrow_mut() = FakeVendor {
            cards,
            close_result: true,
            ..Default::default()
        }
    });
    entry_points()
}

pub fn with<R>(f: impl FnOnce(&mut FakeVendor) -> R) -> R {
    VENDOR.with(|v| f(&mut v.borrow_mut()))
}

pub fn entry_points() -> EntryPoints {
    EntryPoints {
        get_card_num,
        get_device_name,
        get_status,
        open_device,
        close,
        close_device,
        stop,
        write_frame,
    }
}

fn card_mut<R>(card: *const c_int, f: impl FnOnce(&mut FakeCard) -> R) -> Option<R> {
    let index = unsafe { *card };
    with(|v| v.cards.get_mut(index as usize).map(f))
}

unsafe extern "system" fn get_card_num() -> c_int {
    with(|v| v.card_count.unwrap_or(v.cards.len() as c_int))
}

unsafe extern "system" fn get_device_name(card: *const c_int, buf: *mut c_char, max: c_int) {
    with(|v| v.name_buffer_len = Some(max));
    let name = card_mut(card, |c| c.name.clone()).unwrap_or_default();
    let max = max as usize;
    let n = name.len().min(max);
    std::ptr::copy_nonoverlapping(name.as_ptr().cast::<c_char>(), buf, n);
    // Like a careless vendor, only terminate when there is room.
    if n < max {
        *buf.add(n) = 0;
    }
}

unsafe extern "system" fn get_status(card: *const c_int) -> c_int {
    card_mut(card, |c| c.status).unwrap_or(0)
}

unsafe extern "system" fn open_device(card: *const c_int) -> bool {
    card_mut(card, |c| {
        c.open = c.accepts_open;
        c.open
    })
    .unwrap_or(false)
}

unsafe extern "system" fn close() -> bool {
    with(|v| {
        v.close_calls += 1;
        v.close_result
    })
}

unsafe extern "system" fn close_device(card: *const c_int) -> bool {
    card_mut(card, |c| std::mem::replace(&mut c.open, false)).unwrap_or(false)
}

unsafe extern "system" fn stop(card: *const c_int) -> bool {
    let index = *card;
    with(|v| v.stops.push(index));
    card_mut(card, |c| c.open).unwrap_or(false)
}

unsafe extern "system" fn write_frame(
    card: *const c_int,
    data: *const Point,
    bytes: c_int,
    pps: u16,
    reps: u16,
) -> bool {
    let index = *card;
    let count = bytes as usize / POINT_SIZE;
    let points = if count == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(data, count).to_vec()
    };
    with(|v| {
        v.writes.push(WriteCall {
            card: index,
            bytes,
            pps,
            reps,
            points,
        })
    });
    card_mut(card, |c| c.open).unwrap_or(false)
}
