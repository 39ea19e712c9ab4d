//! Debug-only detection of operation bundles calling back into their table.
//!
//! Tables call user code (hash, clone, free, equality) in the middle of
//! lookups, inserts and teardown. A bundle that reaches the same table again
//! through a raw pointer or interior mutability would observe a half-updated
//! bucket. Each public table method marks itself busy; a nested mark panics
//! in debug builds and compiles away in release builds.
//!
//! The embedded marker also keeps tables `!Send`/`!Sync`: they are
//! single-threaded and need an external lock to be shared.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct BusyMark {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    _single_threaded: PhantomData<*mut ()>,
}

impl BusyMark {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _single_threaded: PhantomData,
        }
    }

    /// Mark `op` as running until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> Busy<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("table re-entered by `{op}` while `{outer}` was running");
            }
            self.active.set(Some(op));
            return Busy { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return Busy { _owner: PhantomData };
        }
    }
}

impl Default for BusyMark {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Busy<'a> {
    #[cfg(debug_assertions)]
    owner: &'a BusyMark,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(None);
    }
}
