//! Single-threaded cooperative task scheduler.
//!
//! This is the Rust-native analogue of the source firmware's stackful
//! coroutine runtime: exactly one task executes at a time, suspension only
//! happens at `.await` points, and waking a parked task never resumes it
//! inline -- it only marks it ready for the next scheduling pass. That last
//! property is what lets [`crate::waitlist::Waitlist`] resume operations
//! avoid the iterator-node trick the original C++ used to survive
//! reentrancy.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Wake, Waker};

type BoxFuture = Pin<Box<dyn Future<Output = ()>>>;

struct TaskWaker {
    id: usize,
    ready: Arc<Mutex<VecDeque<usize>>>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }
    fn wake_by_ref(self: &Arc<Self>) {
        let mut q = self.ready.lock().unwrap();
        if !q.contains(&self.id) {
            q.push_back(self.id);
        }
    }
}

struct ExecutorInner {
    tasks: Vec<Option<BoxFuture>>,
    free: Vec<usize>,
    ready: Arc<Mutex<VecDeque<usize>>>,
}

/// The scheduler itself. Cheaply cloneable; all clones share the same task
/// table, which is how a [`JoinHandle`] can ask the executor to cancel its
/// task on drop.
#[derive(Clone)]
pub struct Executor(Rc<RefCell<ExecutorInner>>);

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Executor(Rc::new(RefCell::new(ExecutorInner {
            tasks: Vec::new(),
            free: Vec::new(),
            ready: Arc::new(Mutex::new(VecDeque::new())),
        })))
    }

    fn insert(&self, fut: BoxFuture) -> usize {
        let mut inner = self.0.borrow_mut();
        let id = match inner.free.pop() {
            Some(id) => id,
            None => {
                inner.tasks.push(None);
                inner.tasks.len() - 1
            }
        };
        inner.tasks[id] = Some(fut);
        inner.ready.lock().unwrap().push_back(id);
        id
    }

    /// Spawn a coroutine. Awaiting the returned handle completes when the
    /// coroutine returns; dropping the handle before that cancels it.
    pub fn spawn<T: 'static>(&self, fut: impl Future<Output = T> + 'static) -> JoinHandle<T> {
        let output: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let done: crate::waitlist::Waitlist<()> = crate::waitlist::Waitlist::new();
        let output2 = output.clone();
        let done2 = done.clone();
        let wrapped = async move {
            let v = fut.await;
            *output2.borrow_mut() = Some(v);
            done2.resume_all();
        };
        let id = self.insert(Box::pin(wrapped));
        JoinHandle { executor: self.clone(), task_id: Some(id), output, done, waiting: None }
    }

    /// Cancel a task immediately: dropping its future in place, which
    /// recursively cancels any `Awaitable`s it was holding.
    fn cancel(&self, id: usize) {
        let mut inner = self.0.borrow_mut();
        if inner.tasks.get(id).map(|t| t.is_some()).unwrap_or(false) {
            inner.tasks[id] = None;
            inner.free.push(id);
        }
    }

    /// Run every currently-ready task until none remain ready. Does not
    /// block: if every task is parked on an `Awaitable`, this returns
    /// immediately. Callers drive the timer queue and I/O reactor between
    /// calls to make progress.
    pub fn run_until_idle(&self) {
        loop {
            let next = self.0.borrow().ready.lock().unwrap().pop_front();
            let Some(id) = next else { break };
            let ready = self.0.borrow().ready.clone();
            let waker = Waker::from(Arc::new(TaskWaker { id, ready }));
            let mut cx = Context::from_waker(&waker);

            // Take the future out so polling it doesn't hold `inner` borrowed
            // (the task itself may spawn/cancel other tasks on this executor).
            let fut = self.0.borrow_mut().tasks.get_mut(id).and_then(|t| t.take());
            let Some(mut fut) = fut else { continue };
            match fut.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    let mut inner = self.0.borrow_mut();
                    inner.free.push(id);
                }
                Poll::Pending => {
                    let mut inner = self.0.borrow_mut();
                    if inner.tasks.len() > id {
                        inner.tasks[id] = Some(fut);
                    }
                }
            }
        }
    }

    pub fn task_count(&self) -> usize {
        self.0.borrow().tasks.iter().filter(|t| t.is_some()).count()
    }
}

/// Handle to a spawned coroutine. Implements [`Future`] so it can be awaited
/// to retrieve the coroutine's return value.
pub struct JoinHandle<T> {
    executor: Executor,
    task_id: Option<usize>,
    output: Rc<RefCell<Option<T>>>,
    done: crate::waitlist::Waitlist<()>,
    waiting: Option<crate::waitlist::Awaitable<()>>,
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(v) = self.output.borrow_mut().take() {
            return Poll::Ready(v);
        }
        if self.waiting.is_none() {
            self.waiting = Some(self.done.push(()));
        }
        match Pin::new(self.waiting.as_mut().unwrap()).poll(cx) {
            Poll::Ready(()) => {
                self.waiting = None;
                Poll::Ready(self.output.borrow_mut().take().expect("completion signalled with no output"))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for JoinHandle<T> {
    fn drop(&mut self) {
        if let Some(id) = self.task_id.take() {
            if self.output.borrow().is_none() {
                self.executor.cancel(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_runs_to_completion() {
        let exec = Executor::new();
        let h = exec.spawn(async { 1 + 1 });
        exec.run_until_idle();
        let result = Rc::new(RefCell::new(None));
        let r2 = result.clone();
        let waiter = exec.spawn(async move {
            *r2.borrow_mut() = Some(h.await);
        });
        exec.run_until_idle();
        assert_eq!(*result.borrow(), Some(2));
        drop(waiter);
    }

    #[test]
    fn dropping_join_handle_cancels_task() {
        let exec = Executor::new();
        let ran_to_second_await = Rc::new(RefCell::new(false));
        let flag = ran_to_second_await.clone();
        let list: crate::waitlist::Waitlist<()> = crate::waitlist::Waitlist::new();
        let list2 = list.clone();
        let h = exec.spawn(async move {
            list2.push(()).await;
            *flag.borrow_mut() = true;
        });
        exec.run_until_idle();
        assert_eq!(list.len(), 1);
        drop(h);
        list.resume_all();
        exec.run_until_idle();
        assert!(!*ran_to_second_await.borrow());
    }
}
