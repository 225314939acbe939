//! Intrusive-style waitlists, reimagined over an index arena.
//!
//! The original firmware links waiting-coroutine nodes into a doubly-linked
//! list using raw pointers embedded in the node itself. That pattern isn't
//! expressible in safe Rust, so each [`Waitlist`] instead owns a small slab
//! of slots and nodes reference each other by index -- the same "arena +
//! index instead of raw pointer" substitution this workspace uses for the
//! flash store's record pointers.
//!
//! A [`Waitlist<P>`] is cheap to clone (it's a reference-counted handle) and
//! interior-mutable, since in the single-threaded cooperative model a
//! waitlist is routinely reached from more than one coroutine: whichever one
//! is running at the moment always has exclusive access between await
//! points, so a `RefCell` borrow never conflicts.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

struct Slot<P> {
    params: Rc<RefCell<P>>,
    waker: Option<Waker>,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner<P> {
    slots: Vec<Option<Slot<P>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<P> Inner<P> {
    fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new(), head: None, tail: None }
    }

    fn link_tail(&mut self, key: usize) {
        let old_tail = self.tail;
        if let Some(t) = old_tail {
            self.slots[t].as_mut().unwrap().next = Some(key);
        } else {
            self.head = Some(key);
        }
        self.slots[key].as_mut().unwrap().prev = old_tail;
        self.tail = Some(key);
    }

    fn unlink(&mut self, key: usize) {
        let (prev, next) = {
            let slot = self.slots[key].as_ref().unwrap();
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn remove(&mut self, key: usize) -> Option<Slot<P>> {
        if self.slots.get(key).map(|s| s.is_some()).unwrap_or(false) {
            self.unlink(key);
            let slot = self.slots[key].take();
            self.free.push(key);
            slot
        } else {
            None
        }
    }
}

/// Waitlist of tasks parked on parameters of type `P`: a read/write buffer, a
/// timeout, a subscriber conversion context, whatever the operation needs to
/// hand between producer and waiter.
pub struct Waitlist<P>(Rc<RefCell<Inner<P>>>);

impl<P> Clone for Waitlist<P> {
    fn clone(&self) -> Self {
        Waitlist(self.0.clone())
    }
}

impl<P> Default for Waitlist<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Waitlist<P> {
    pub fn new() -> Self {
        Waitlist(Rc::new(RefCell::new(Inner::new())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().head.is_none()
    }

    /// Number of tasks currently parked.
    pub fn len(&self) -> usize {
        let inner = self.0.borrow();
        let mut n = 0;
        let mut cur = inner.head;
        while let Some(k) = cur {
            n += 1;
            cur = inner.slots[k].as_ref().unwrap().next;
        }
        n
    }

    /// Park `params` at the tail of the list and return an awaitable for it.
    /// Awaiting it resolves to `params`, possibly mutated in place by
    /// whichever producer resumed it.
    pub fn push(&self, params: P) -> Awaitable<P> {
        let mut inner = self.0.borrow_mut();
        let key = match inner.free.pop() {
            Some(k) => k,
            None => {
                inner.slots.push(None);
                inner.slots.len() - 1
            }
        };
        let shared = Rc::new(RefCell::new(params));
        inner.slots[key] = Some(Slot { params: shared.clone(), waker: None, prev: None, next: None });
        inner.link_tail(key);
        drop(inner);
        Awaitable { list: Some(self.clone()), key, shared: Some(shared) }
    }

    /// Visit the params of the task currently at the head of the list,
    /// without removing it. Used by readers that want to peek at a pending
    /// request (e.g. to start I/O for it) before it is later resumed.
    pub fn peek_front<R>(&self, f: impl FnOnce(&P) -> R) -> Option<R> {
        let inner = self.0.borrow();
        let head = inner.head?;
        let slot = inner.slots[head].as_ref().unwrap();
        Some(f(&slot.params.borrow()))
    }

    pub fn with_front_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        let inner = self.0.borrow();
        let head = inner.head?;
        let slot = inner.slots[head].as_ref().unwrap();
        Some(f(&mut slot.params.borrow_mut()))
    }

    /// Overwrite the params of the task at the head of the list in place,
    /// then resume it. Used by a producer that parked a consumer with a
    /// placeholder value (e.g. `P::default()`) and now has the real payload
    /// to deliver.
    pub fn resume_first_with(&self, value: P) -> bool {
        let delivered = self.with_front_mut(|p| *p = value).is_some();
        if delivered {
            self.resume_first();
        }
        delivered
    }

    /// Remove and resume the first waiting task. Returns `true` if a task
    /// was resumed, `false` if the list was empty.
    pub fn resume_first(&self) -> bool {
        let slot = self.0.borrow_mut().remove_front();
        match slot {
            Some(s) => {
                if let Some(w) = s.waker {
                    w.wake();
                }
                true
            }
            None => false,
        }
    }

    /// Resume every currently-waiting task, in enqueue order.
    pub fn resume_all(&self) {
        while self.resume_first() {}
    }

    /// Resume the first waiting task if `predicate` accepts its params.
    pub fn resume_first_if(&self, mut predicate: impl FnMut(&P) -> bool) -> bool {
        let head = self.0.borrow().head;
        let Some(key) = head else { return false };
        let accept = {
            let inner = self.0.borrow();
            let slot = inner.slots[key].as_ref().unwrap();
            predicate(&slot.params.borrow())
        };
        if !accept {
            return false;
        }
        let slot = self.0.borrow_mut().remove(key);
        if let Some(w) = slot.and_then(|s| s.waker) {
            w.wake();
        }
        true
    }

    /// Resume every waiting task for which `predicate` is true, preserving
    /// the relative order of the tasks that remain parked. Safe to call a
    /// predicate that inspects but does not mutate the list: the traversal
    /// snapshots each node's successor before the predicate runs, so the
    /// predicate may freely be paired with a later `push` from the same
    /// call site without corrupting iteration (the new node can only ever
    /// land after this traversal returns, since waking never resumes a
    /// coroutine inline -- it just marks it ready for the executor).
    pub fn resume_all_if(&self, mut predicate: impl FnMut(&P) -> bool) {
        let mut cur = self.0.borrow().head;
        while let Some(key) = cur {
            let (next, accept) = {
                let inner = self.0.borrow();
                let slot = inner.slots[key].as_ref().unwrap();
                (slot.next, predicate(&slot.params.borrow()))
            };
            if accept {
                let slot = self.0.borrow_mut().remove(key);
                if let Some(w) = slot.and_then(|s| s.waker) {
                    w.wake();
                }
            }
            cur = next;
        }
    }
}

impl<P> Inner<P> {
    fn remove_front(&mut self) -> Option<Slot<P>> {
        let head = self.head?;
        self.remove(head)
    }
}

/// A pending operation parked on a [`Waitlist`].
///
/// Dropping an `Awaitable` while it is still parked cancels the operation:
/// the node is unlinked from its waitlist with no observable effect on the
/// other waiters, matching the cancellation contract of the task runtime.
/// `Awaitable` is move-only (it is never `Clone`), mirroring the RAII handle
/// in the source firmware.
pub struct Awaitable<P> {
    list: Option<Waitlist<P>>,
    key: usize,
    shared: Option<Rc<RefCell<P>>>,
}

impl<P> Awaitable<P> {
    /// An already-resolved awaitable, for call sites that sometimes have
    /// nothing to wait for (e.g. `Synchronizer::wait_for_consumer` when a
    /// consumer is already parked).
    pub fn ready(value: P) -> Self {
        Awaitable { list: None, key: 0, shared: Some(Rc::new(RefCell::new(value))) }
    }

    pub fn has_finished(&self) -> bool {
        match &self.list {
            Some(list) => !list.0.borrow().slots.get(self.key).map(|s| s.is_some()).unwrap_or(false),
            None => true,
        }
    }

    /// Cancel the pending operation early, same as dropping the awaitable
    /// but usable when you still need to observe the (partially-applied)
    /// params afterward.
    pub fn cancel(&mut self) {
        if let Some(list) = &self.list {
            list.0.borrow_mut().remove(self.key);
        }
        self.list = None;
    }
}

impl<P> Drop for Awaitable<P> {
    fn drop(&mut self) {
        if let Some(list) = self.list.take() {
            list.0.borrow_mut().remove(self.key);
        }
    }
}

impl<P: Unpin> Future for Awaitable<P> {
    type Output = P;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<P> {
        let finished = match &self.list {
            Some(list) => !list.0.borrow().slots.get(self.key).map(|s| s.is_some()).unwrap_or(false),
            None => true,
        };
        if finished {
            self.list = None;
            let shared = self.shared.take().expect("Awaitable polled after completion");
            let value = Rc::try_unwrap(shared)
                .unwrap_or_else(|_| panic!("Awaitable params still shared after resume"))
                .into_inner();
            Poll::Ready(value)
        } else {
            let list = self.list.as_ref().unwrap();
            let mut inner = list.0.borrow_mut();
            inner.slots[self.key].as_mut().unwrap().waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;

    #[test]
    fn fifo_order_preserved() {
        let list: Waitlist<u32> = Waitlist::new();
        let exec = Executor::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..3u32 {
            let a = list.push(i);
            let order = order.clone();
            handles.push(exec.spawn(async move {
                let v = a.await;
                order.borrow_mut().push(v);
            }));
        }
        exec.run_until_idle();
        assert!(list.resume_first());
        exec.run_until_idle();
        assert!(list.resume_first());
        exec.run_until_idle();
        assert!(list.resume_first());
        exec.run_until_idle();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn cancel_preserves_order_of_others() {
        let list: Waitlist<u32> = Waitlist::new();
        let exec = Executor::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a0 = list.push(0);
        let a1 = list.push(1);
        let a2 = list.push(2);

        drop(a1); // cancel the middle waiter

        let order2 = order.clone();
        let h0 = exec.spawn(async move { order2.borrow_mut().push(a0.await) });
        let order2 = order.clone();
        let h2 = exec.spawn(async move { order2.borrow_mut().push(a2.await) });
        exec.run_until_idle();

        assert_eq!(list.len(), 2);
        list.resume_all();
        exec.run_until_idle();
        assert_eq!(*order.borrow(), vec![0, 2]);
        drop(h0);
        drop(h2);
    }

    #[test]
    fn resume_all_if_keeps_non_matching_parked() {
        let list: Waitlist<u32> = Waitlist::new();
        let _a0 = list.push(0);
        let _a1 = list.push(1);
        let _a2 = list.push(2);
        list.resume_all_if(|v| v % 2 == 0);
        assert_eq!(list.len(), 1);
    }
}
