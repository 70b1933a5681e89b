//! UI-thread confinement checks.
//!
//! A [`Tree`](crate::Tree) and everything derived from it must be used on the
//! thread that created it. [`ThreadAffinity`] records that thread and asserts
//! on it. Checks run in debug builds only unless the caller uses the
//! always-on variants.
//!
//! ```
//! use horizon_arbor::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! affinity.debug_assert_same_thread();
//! assert!(affinity.is_same_thread());
//! ```

use std::thread::ThreadId;

/// Records the thread an object was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the calling thread is the bound thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if called from another thread. Active in all builds.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("tree accessed from a thread other than its UI thread")
    }

    /// Panic with `msg` if called from another thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only variant of [`assert_same_thread`](Self::assert_same_thread).
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        panic!(
            "\n\
            THREAD AFFINITY VIOLATION\n\
            \n\
            {msg}\n\
            \n\
            Current thread: \"{}\" (ID: {:?})\n\
            Owning thread ID: {:?}\n\
            \n\
            Model mutation, layout, painting and hit-testing must all run on\n\
            the UI thread that created the tree.",
            current.name().unwrap_or("<unnamed>"),
            current.id(),
            self.thread_id,
        )
    }
}
