// Scoped page-scroll lock. The page is locked while at least one guard is alive.
// Dropping the last guard releases it, including on early return or unmount.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::debug;

/// Whatever actually toggles native page scroll (on the web: `body.style.overflow`).
pub trait PageScrollHost {
    fn set_page_scroll_locked(&self, locked: bool);
}

struct LockInner {
    holders: Cell<usize>,
    host: Box<dyn PageScrollHost>,
}

/// Shared handle to the page scroll lock. Clones refer to the same lock.
#[derive(Clone)]
pub struct ScrollLock {
    inner: Rc<LockInner>,
}

impl ScrollLock {
    pub fn new(host: impl PageScrollHost + 'static) -> Self {
        ScrollLock {
            inner: Rc::new(LockInner {
                holders: Cell::new(0),
                host: Box::new(host),
            }),
        }
    }

    /// Locks page scroll until the returned guard is dropped.
    pub fn acquire(&self) -> ScrollLockGuard {
        let holders = self.inner.holders.get();
        if holders == 0 {
            debug!("page scroll locked");
            self.inner.host.set_page_scroll_locked(true);
        }
        self.inner.holders.set(holders + 1);
        ScrollLockGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.inner.holders.get() > 0
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.inner.holders.get())
            .finish()
    }
}

/// Holds the page scroll lock.
pub struct ScrollLockGuard {
    inner: Rc<LockInner>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.inner.holders.get().saturating_sub(1);
        self.inner.holders.set(holders);
        if holders == 0 {
            debug!("page scroll released");
            self.inner.host.set_page_scroll_locked(false);
        }
    }
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScrollLockGuard")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every toggle so tests can assert on the sequence.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingHost {
        pub calls: Rc<RefCell<Vec<bool>>>,
    }

    impl PageScrollHost for RecordingHost {
        fn set_page_scroll_locked(&self, locked: bool) {
            self.calls.borrow_mut().push(locked);
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let host = RecordingHost::default();
        let lock = ScrollLock::new(host.clone());

        {
            let _guard = lock.acquire();
            assert!(lock.is_locked());
        }

        assert!(!lock.is_locked());
        assert_eq!(*host.calls.borrow(), vec![true, false]);
    }

    #[test]
    fn nested_guards_unlock_once() {
        let host = RecordingHost::default();
        let lock = ScrollLock::new(host.clone());

        let outer = lock.acquire();
        let inner = lock.clone().acquire();
        drop(outer);
        assert!(lock.is_locked());
        drop(inner);

        assert!(!lock.is_locked());
        assert_eq!(*host.calls.borrow(), vec![true, false]);
    }
}
