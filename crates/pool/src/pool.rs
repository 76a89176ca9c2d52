use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{PoolError, Result};
use crate::handle::TaskHandle;
use crate::signal::{DrainLatch, WakeSignal};

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

struct Envelope<S> {
    job: Job<S>,
    done: oneshot::Sender<()>,
}

struct WorkerSlot<S> {
    queue: Mutex<VecDeque<Envelope<S>>>,
    signal: WakeSignal,
}

impl<S> WorkerSlot<S> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            signal: WakeSignal::default(),
        }
    }

    fn pop(&self) -> Option<Envelope<S>> {
        self.queue.lock().pop_front()
    }

    fn push(&self, envelope: Envelope<S>) {
        self.queue.lock().push_back(envelope);
    }
}

struct Shared<S> {
    slots: Vec<WorkerSlot<S>>,
    /// Tasks accepted but not yet dequeued by any worker.
    waiting: AtomicUsize,
    /// Tasks accepted but not yet finished.
    latch: DrainLatch,
    stop: AtomicBool,
}

impl<S> Shared<S> {
    fn run(&self, worker: usize, envelope: Envelope<S>, state: &mut S) {
        self.waiting.fetch_sub(1, Ordering::AcqRel);
        let Envelope { job, done } = envelope;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(state)));
        // The latch goes down first so a resolved handle implies the count already dropped.
        self.latch.complete();
        match outcome {
            Ok(()) => {
                let _ = done.send(());
            }
            Err(_) => {
                warn!(worker, "task panicked, dropping its completion handle");
                drop(done);
            }
        }
    }

    /// Scans peers round-robin starting after `worker` and runs the first
    /// task found. Returns whether anything ran.
    fn steal_one(&self, worker: usize, state: &mut S) -> bool {
        let n = self.slots.len();
        for offset in 1..n {
            let victim = (worker + offset) % n;
            if let Some(envelope) = self.slots[victim].pop() {
                debug!(worker, victim, "stole task");
                self.run(worker, envelope, state);
                return true;
            }
        }
        false
    }
}

fn worker_loop<S>(index: usize, mut state: S, shared: &Shared<S>) -> S {
    let slot = &shared.slots[index];
    loop {
        slot.signal.acquire();

        while shared.waiting.load(Ordering::Acquire) > 0 {
            while let Some(envelope) = slot.pop() {
                shared.run(index, envelope, &mut state);
            }
            // One steal per pass, then re-check the waiting count.
            if !shared.steal_one(index, &mut state) {
                thread::yield_now();
            }
        }

        if shared.stop.load(Ordering::Acquire) {
            break;
        }
    }
    debug!(worker = index, "worker stopped");
    state
}

/// Fixed pool of OS threads, each owning a worker-local state `S`.
///
/// Tasks are distributed round-robin at submission time and balanced at run
/// time by stealing: a worker whose own queue is empty takes one task from the
/// first non-empty peer queue, then re-checks for outstanding work. A task,
/// once started, always runs to completion; the only way to stop the pool is
/// the drain-then-stop protocol in [`WorkerPool::shutdown`] (also run on drop).
pub struct WorkerPool<S: Send + 'static> {
    shared: Arc<Shared<S>>,
    handles: Vec<JoinHandle<S>>,
    next: AtomicUsize,
}

impl<S: Send + 'static> WorkerPool<S> {
    /// Starts one worker per state. An empty vector is rejected so that every
    /// submission always has a worker to land on.
    pub fn new(states: Vec<S>) -> Result<Self> {
        if states.is_empty() {
            return Err(PoolError::EmptyPool);
        }

        let shared = Arc::new(Shared {
            slots: (0..states.len()).map(|_| WorkerSlot::new()).collect(),
            waiting: AtomicUsize::new(0),
            latch: DrainLatch::default(),
            stop: AtomicBool::new(false),
        });

        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(states.len()),
            next: AtomicUsize::new(0),
        };

        for (index, state) in states.into_iter().enumerate() {
            let shared = Arc::clone(&pool.shared);
            // On failure `pool` is dropped, which stops the workers already running.
            let handle = thread::Builder::new()
                .name(format!("pathctx-worker-{index}"))
                .spawn(move || worker_loop(index, state, &shared))?;
            pool.handles.push(handle);
        }

        debug!(workers = pool.handles.len(), "worker pool started");
        Ok(pool)
    }

    /// Starts `workers` threads with states produced by `init(index)`.
    pub fn with_workers(workers: usize, init: impl FnMut(usize) -> S) -> Result<Self> {
        Self::new((0..workers).map(init).collect())
    }

    pub fn workers(&self) -> usize {
        self.shared.slots.len()
    }

    /// Tasks accepted and not yet finished.
    pub fn outstanding(&self) -> usize {
        self.shared.latch.outstanding()
    }

    /// Queues `job` on the next worker in rotation.
    pub fn submit<F>(&self, job: F) -> Result<TaskHandle>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let worker = self.next.fetch_add(1, Ordering::Relaxed) % self.shared.slots.len();
        self.submit_to(worker, job)
    }

    /// Queues `job` on a specific worker's private queue. Idle peers are woken
    /// as well so they can steal from it.
    pub fn submit_to<F>(&self, worker: usize, job: F) -> Result<TaskHandle>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let slot = self
            .shared
            .slots
            .get(worker)
            .ok_or(PoolError::UnknownWorker(worker))?;

        let (done, rx) = oneshot::channel();

        // Counters go up before the push so a fast dequeue can never underflow them.
        self.shared.latch.add();
        self.shared.waiting.fetch_add(1, Ordering::AcqRel);
        slot.push(Envelope {
            job: Box::new(job),
            done,
        });

        slot.signal.release();
        for (index, peer) in self.shared.slots.iter().enumerate() {
            if index != worker {
                peer.signal.release();
            }
        }

        Ok(TaskHandle::new(rx))
    }

    /// Waits until every accepted task has finished, stops the workers and
    /// returns their states in worker-index order.
    pub fn shutdown(mut self) -> Result<Vec<S>> {
        self.close()
    }

    fn close(&mut self) -> Result<Vec<S>> {
        self.shared.latch.wait();
        self.shared.stop.store(true, Ordering::Release);
        for slot in &self.shared.slots {
            slot.signal.release();
        }

        let mut states = Vec::with_capacity(self.handles.len());
        let mut failure = None;
        for (index, handle) in self.handles.drain(..).enumerate() {
            match handle.join() {
                Ok(state) => states.push(state),
                Err(_) => {
                    warn!(worker = index, "worker thread panicked");
                    failure.get_or_insert(PoolError::WorkerPanicked(index));
                }
            }
        }

        debug!(workers = states.len(), "worker pool stopped");
        match failure {
            Some(err) => Err(err),
            None => Ok(states),
        }
    }
}

impl<S: Send + 'static> Drop for WorkerPool<S> {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            let _ = self.close();
        }
    }
}
