//! Bounded-concurrency worker pool for locale downloads
//!
//! Replaces unbounded per-task fan-out with a fixed set of workers draining
//! a shared queue: tasks are submitted as boxed futures, at most
//! `worker_count` run at any instant, and `join` acts as a barrier that
//! waits for every submitted task to complete.
//!
//! Task failures are the tasks' own business; the pool itself never
//! propagates them, so one failed download cannot abort its siblings.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::workers::POOL_QUEUE_CAPACITY;
use crate::errors::PoolError;

/// Fixed-size pool of workers draining a shared task queue
#[derive(Debug)]
pub struct WorkerPool {
    sender: mpsc::Sender<BoxFuture<'static, ()>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn a pool with the given number of workers
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidWorkerCount` for a worker count below one.
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        if worker_count < 1 {
            return Err(PoolError::InvalidWorkerCount {
                count: worker_count,
            });
        }

        let (sender, receiver) = mpsc::channel::<BoxFuture<'static, ()>>(POOL_QUEUE_CAPACITY);
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..worker_count)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move {
                    loop {
                        // Take the next task, releasing the queue lock before
                        // running it so siblings keep draining in parallel
                        let task = { receiver.lock().await.recv().await };
                        match task {
                            Some(task) => task.await,
                            None => break,
                        }
                    }
                    debug!("Worker {} finished", worker_id);
                })
            })
            .collect();

        Ok(Self { sender, handles })
    }

    /// Submit a task to the pool
    ///
    /// Suspends while the queue is at capacity; tasks begin executing as
    /// soon as a worker is free.
    pub async fn submit<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        // Send only fails when all workers are gone, which cannot happen
        // while the pool still holds their join handles
        self.sender
            .send(Box::pin(task))
            .await
            .expect("worker pool queue closed unexpectedly");
    }

    /// Close the queue and wait for every submitted task to complete
    pub async fn join(self) {
        drop(self.sender);
        for handle in self.handles {
            // A panicked task takes down only its worker, not the join
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        let err = tokio_test::block_on(async { WorkerPool::new(0).unwrap_err() });
        assert!(matches!(err, PoolError::InvalidWorkerCount { count: 0 }));
    }

    #[tokio::test]
    async fn test_all_tasks_complete() {
        let pool = WorkerPool::new(4).unwrap();
        let completed = Arc::new(AtomicUsize::new(0));

        for _ in 0..32 {
            let completed = Arc::clone(&completed);
            pool.submit(async move {
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }
        pool.join().await;

        assert_eq!(completed.load(Ordering::SeqCst), 32);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_worker_count() {
        const WORKERS: usize = 3;
        const TASKS: usize = 24;

        let pool = WorkerPool::new(WORKERS).unwrap();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        for _ in 0..TASKS {
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            pool.submit(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
            .await;
        }
        pool.join().await;

        assert!(max_in_flight.load(Ordering::SeqCst) <= WORKERS);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_task_does_not_abort_siblings() {
        let pool = WorkerPool::new(2).unwrap();
        let completed = Arc::new(AtomicUsize::new(0));

        pool.submit(async { panic!("simulated download failure") })
            .await;
        for _ in 0..8 {
            let completed = Arc::clone(&completed);
            pool.submit(async move {
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }
        pool.join().await;

        assert_eq!(completed.load(Ordering::SeqCst), 8);
    }
}
