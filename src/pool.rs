//! Fixed-size thread pool for business operations.
//!
//! Operations are ordinary blocking calls. [`WorkerPool::submit`] queues one
//! and returns a [`Ticket`] the caller can wait on.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    ShutDown,
    /// The job panicked before producing a result.
    #[error("job ended without a result")]
    Lost,
    #[error("timed out waiting for job result")]
    Timeout,
}

/// Handle to the result of a submitted job.
pub struct Ticket<T> {
    rx: Receiver<T>,
}

impl<T> Ticket<T> {
    /// Block until the job has run.
    pub fn wait(self) -> Result<T, PoolError> {
        self.rx.recv().map_err(|_| PoolError::Lost)
    }

    pub fn wait_timeout(self, timeout: Duration) -> Result<T, PoolError> {
        use std::sync::mpsc::RecvTimeoutError;
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => PoolError::Timeout,
            RecvTimeoutError::Disconnected => PoolError::Lost,
        })
    }
}

pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` worker threads (at least one).
    pub fn new(size: usize) -> Self {
        let (tx, rx) = channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..size.max(1))
            .map(|index| {
                let rx = Arc::clone(&rx);
                thread::spawn(move || loop {
                    let next = match rx.lock() {
                        Ok(guard) => guard.recv(),
                        Err(_) => {
                            error!(worker = index, "job queue lock poisoned");
                            break;
                        }
                    };
                    match next {
                        Ok(job) => {
                            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                error!(worker = index, "job panicked");
                            }
                        }
                        Err(_) => {
                            debug!(worker = index, "pool worker exiting");
                            break;
                        }
                    }
                })
            })
            .collect();

        Self {
            jobs: Some(tx),
            workers,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Jobs start in submission order.
    pub fn submit<T, F>(&self, job: F) -> Result<Ticket<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let jobs = self.jobs.as_ref().ok_or(PoolError::ShutDown)?;
        let (tx, rx) = channel();
        jobs.send(Box::new(move || {
            let _ = tx.send(job());
        }))
        .map_err(|_| PoolError::ShutDown)?;
        Ok(Ticket { rx })
    }

    /// Finish queued jobs, then join every worker.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.jobs.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("pool worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}
