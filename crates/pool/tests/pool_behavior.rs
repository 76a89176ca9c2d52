use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pathctx_pool::{PoolError, WorkerPool};

/// Worker-local tally of the tasks a worker ran.
#[derive(Default)]
struct Tally {
    ran: usize,
}

#[test]
fn every_task_runs_exactly_once() {
    for workers in 1..=4 {
        for tasks in [1usize, 7, 50] {
            let hits: Arc<Vec<AtomicUsize>> =
                Arc::new((0..tasks).map(|_| AtomicUsize::new(0)).collect());

            let pool = WorkerPool::with_workers(workers, |_| Tally::default()).unwrap();
            for id in 0..tasks {
                let hits = Arc::clone(&hits);
                pool.submit(move |tally: &mut Tally| {
                    hits[id].fetch_add(1, Ordering::SeqCst);
                    tally.ran += 1;
                })
                .unwrap();
            }
            let states = pool.shutdown().unwrap();

            assert_eq!(states.len(), workers);
            assert_eq!(states.iter().map(|t| t.ran).sum::<usize>(), tasks);
            for (id, hit) in hits.iter().enumerate() {
                assert_eq!(
                    hit.load(Ordering::SeqCst),
                    1,
                    "task {id} with {workers} workers / {tasks} tasks"
                );
            }
        }
    }
}

#[test]
fn shutdown_returns_only_after_all_tasks_finish() {
    let finished = Arc::new(AtomicUsize::new(0));
    let pool = WorkerPool::with_workers(2, |_| ()).unwrap();
    for _ in 0..6 {
        let finished = Arc::clone(&finished);
        pool.submit(move |_| {
            thread::sleep(Duration::from_millis(5));
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.shutdown().unwrap();
    assert_eq!(finished.load(Ordering::SeqCst), 6);
}

#[test]
fn idle_workers_steal_from_a_loaded_peer() {
    // Every task blocks until all three are running at once, which can only
    // happen if the two workers with empty queues steal from worker 0.
    let workers = 3;
    let barrier = Arc::new(Barrier::new(workers));
    let pool = WorkerPool::with_workers(workers, |_| Tally::default()).unwrap();
    for _ in 0..workers {
        let barrier = Arc::clone(&barrier);
        pool.submit_to(0, move |tally: &mut Tally| {
            barrier.wait();
            tally.ran += 1;
        })
        .unwrap();
    }

    let states = pool.shutdown().unwrap();
    assert!(states.iter().all(|t| t.ran == 1));
}

#[test]
fn uneven_queues_drain_without_deadlock() {
    let pool = WorkerPool::with_workers(2, |_| Tally::default()).unwrap();
    let mut handles = Vec::new();
    for _ in 0..4 {
        handles.push(
            pool.submit_to(0, |tally: &mut Tally| {
                thread::sleep(Duration::from_millis(2));
                tally.ran += 1;
            })
            .unwrap(),
        );
    }
    handles.push(pool.submit_to(1, |tally: &mut Tally| tally.ran += 1).unwrap());

    let states = pool.shutdown().unwrap();
    assert_eq!(states.iter().map(|t| t.ran).sum::<usize>(), 5);
    for handle in handles {
        handle.wait().unwrap();
    }
}

#[test]
fn handle_reports_completion() {
    let pool = WorkerPool::with_workers(1, |_| 0usize).unwrap();
    let handle = pool.submit(|count: &mut usize| *count += 1).unwrap();
    handle.wait().unwrap();
    assert_eq!(pool.shutdown().unwrap(), vec![1]);
}

#[test]
fn panicking_task_does_not_take_down_the_pool() {
    let pool = WorkerPool::with_workers(1, |_| 0usize).unwrap();
    let bad = pool.submit(|_: &mut usize| panic!("boom")).unwrap();
    let good = pool.submit(|count: &mut usize| *count += 1).unwrap();

    assert!(matches!(bad.wait(), Err(PoolError::TaskPanicked)));
    good.wait().unwrap();
    assert_eq!(pool.shutdown().unwrap(), vec![1]);
}

#[test]
fn dropping_the_pool_drains_pending_work() {
    let done = Arc::new(AtomicBool::new(false));
    {
        let pool = WorkerPool::with_workers(2, |_| ()).unwrap();
        let done = Arc::clone(&done);
        pool.submit(move |_| {
            thread::sleep(Duration::from_millis(10));
            done.store(true, Ordering::SeqCst);
        })
        .unwrap();
    }
    assert!(done.load(Ordering::SeqCst));
}

#[test]
fn pool_is_reusable_after_a_drain() {
    let pool = WorkerPool::with_workers(2, |_| Tally::default()).unwrap();
    pool.submit(|tally: &mut Tally| tally.ran += 1)
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(pool.outstanding(), 0);

    pool.submit(|tally: &mut Tally| tally.ran += 1).unwrap();
    let states = pool.shutdown().unwrap();
    assert_eq!(states.iter().map(|t| t.ran).sum::<usize>(), 2);
}
