//! Rendezvous points built directly on [`Waitlist`].

use crate::waitlist::{Awaitable, Waitlist};

/// A waitlist used purely as a rendezvous point: producers call
/// [`Barrier::resume_first`]/[`Barrier::resume_all`] to wake consumers
/// parked in [`Barrier::wait`].
#[derive(Clone)]
pub struct Barrier<P = ()>(Waitlist<P>);

impl<P> Default for Barrier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Barrier<P> {
    pub fn new() -> Self {
        Barrier(Waitlist::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resume_first(&self) -> bool {
        self.0.resume_first()
    }

    pub fn resume_all(&self) {
        self.0.resume_all()
    }

    /// Overwrite the head waiter's params with `value`, then resume it.
    pub fn resume_first_with(&self, value: P) -> bool {
        self.0.resume_first_with(value)
    }
}

impl<P: Default> Barrier<P> {
    #[must_use]
    pub fn wait(&self) -> Awaitable<P> {
        self.0.push(P::default())
    }
}

impl<P> Barrier<P> {
    #[must_use]
    pub fn wait_with(&self, params: P) -> Awaitable<P> {
        self.0.push(params)
    }
}

/// A [`Barrier`] that additionally lets a producer wait until at least one
/// consumer is parked, so a `resume_*` call is never wasted on an empty
/// list (which would otherwise silently drop the notification -- the
/// runtime never buffers publications).
#[derive(Clone)]
pub struct Synchronizer<P = ()> {
    data: Barrier<P>,
    empty: Barrier<()>,
}

impl<P> Default for Synchronizer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Synchronizer<P> {
    pub fn new() -> Self {
        Synchronizer { data: Barrier::new(), empty: Barrier::new() }
    }

    /// Deliver `value` to the longest-waiting consumer. Call
    /// [`Synchronizer::wait_for_consumer`] first so this is never wasted on
    /// an empty list.
    pub fn send(&self, value: P) -> bool {
        self.data.resume_first_with(value)
    }

    /// Wait for a producer to pass data via `resume_first`/`resume_all`.
    /// Notifies any producer blocked in `wait_for_consumer` before parking,
    /// so it can't race ahead of us.
    #[must_use]
    pub fn wait(&self) -> Awaitable<P>
    where
        P: Default,
    {
        let was_empty = self.data.is_empty();
        let a = self.data.wait();
        if was_empty {
            self.empty.resume_first();
        }
        a
    }

    /// Wait, as a producer, until at least one consumer is parked in
    /// [`Synchronizer::wait`].
    #[must_use]
    pub fn wait_for_consumer(&self) -> Awaitable<()> {
        if !self.data.is_empty() {
            return Awaitable::ready(());
        }
        self.empty.wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn barrier_wakes_single_waiter_in_order() {
        let exec = Executor::new();
        let barrier: Barrier<u32> = Barrier::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let b2 = barrier.clone();
        let l2 = log.clone();
        let h1 = exec.spawn(async move { l2.borrow_mut().push(b2.wait_with(1).await) });
        let b3 = barrier.clone();
        let l3 = log.clone();
        let h2 = exec.spawn(async move { l3.borrow_mut().push(b3.wait_with(2).await) });
        exec.run_until_idle();

        barrier.resume_first();
        exec.run_until_idle();
        assert_eq!(*log.borrow(), vec![1]);

        barrier.resume_first();
        exec.run_until_idle();
        assert_eq!(*log.borrow(), vec![1, 2]);
        drop(h1);
        drop(h2);
    }

    #[test]
    fn synchronizer_unblocks_producer_once_consumer_parked() {
        let exec = Executor::new();
        let sync: Rc<Synchronizer<u32>> = Rc::new(Synchronizer::new());
        let produced = Rc::new(RefCell::new(false));

        let s2 = sync.clone();
        let p2 = produced.clone();
        let producer = exec.spawn(async move {
            s2.wait_for_consumer().await;
            s2.send(7);
            *p2.borrow_mut() = true;
        });
        exec.run_until_idle();
        assert!(!*produced.borrow(), "producer must not run ahead of a parked consumer");

        let s3 = sync.clone();
        let received = Rc::new(RefCell::new(None));
        let r2 = received.clone();
        let consumer = exec.spawn(async move {
            *r2.borrow_mut() = Some(s3.wait().await);
        });
        exec.run_until_idle();
        assert!(*produced.borrow());
        assert_eq!(*received.borrow(), Some(7));
        drop(producer);
        drop(consumer);
    }
}
