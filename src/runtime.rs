//! Task scheduling and timers for the single-threaded render loop.
//!
//! All work runs on one thread; render tasks are local futures that
//! interleave with user input. On wasm32 they go through `spawn_local` and
//! `setTimeout`; natively through a `futures` local executor.

use futures::future::LocalBoxFuture;

/// Runs a detached local task to completion. There is no cancellation:
/// superseded tasks finish and are discarded by the generation check.
pub trait Spawn {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Resolves after a delay. Used for bounded settle waits, the spreadsheet
/// fallback and the copy status banner, never as synchronization.
pub trait Timer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::executor::LocalSpawner;
    use futures::future::{self, LocalBoxFuture};
    use futures::task::LocalSpawnExt;
    use futures::FutureExt;

    use super::{Spawn, Timer};

    impl Spawn for LocalSpawner {
        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            if let Err(e) = self.spawn_local(task) {
                tracing::error!(error = %e, "executor rejected render task");
            }
        }
    }

    /// A timer whose delays elapse immediately; the requested durations are
    /// recorded so callers can check what was scheduled.
    #[derive(Debug, Clone, Default)]
    pub struct ImmediateTimer {
        requested: Rc<RefCell<Vec<u32>>>,
    }

    impl ImmediateTimer {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every delay requested so far, in order.
        #[must_use]
        pub fn requested(&self) -> Vec<u32> {
            self.requested.borrow().clone()
        }
    }

    impl Timer for ImmediateTimer {
        fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
            self.requested.borrow_mut().push(ms);
            future::ready(()).boxed_local()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ImmediateTimer;
