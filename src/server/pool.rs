//! # Pool de Workers
//! src/server/pool.rs
//!
//! Pool de threads de tamaño fijo. Las tareas se encolan en un canal sin
//! límite, así que `execute` nunca bloquea al thread que acepta conexiones
//! aunque todos los workers estén ocupados.
//!
//! Al hacer `shutdown` se cierra el canal: las tareas ya encoladas se
//! terminan de ejecutar y los workers salen cuando la cola queda vacía.

use log::{debug, error};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Tamaño por defecto del pool
pub const DEFAULT_POOL_SIZE: usize = 64;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Error al enviar trabajo a un pool que ya se cerró
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolShutDown;

impl std::fmt::Display for PoolShutDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Worker pool is shut down")
    }
}

impl std::error::Error for PoolShutDown {}

struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

/// Pool de threads con número fijo de workers
pub struct WorkerPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl WorkerPool {
    /// Crea un pool con `size` workers
    ///
    /// `size == 0` se trata como 1. Falla si el sistema no permite crear
    /// los threads.
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || Self::worker_loop(id, receiver))?;
            workers.push(Worker { id, handle });
        }

        Ok(Self {
            workers,
            sender: Some(sender),
        })
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Encola una tarea
    pub fn execute<F>(&self, job: F) -> Result<(), PoolShutDown>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolShutDown)?;
        sender.send(Box::new(job)).map_err(|_| PoolShutDown)
    }

    /// Deja de aceptar tareas y espera a que terminen las encoladas
    pub fn shutdown(&mut self) {
        // Cerrar el canal despierta a los workers bloqueados en recv()
        drop(self.sender.take());

        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                error!("Worker {} exited abnormally", worker.id);
            }
        }
    }

    fn worker_loop(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
        loop {
            let job = {
                let receiver = receiver.lock().unwrap_or_else(PoisonError::into_inner);
                receiver.recv()
            };

            match job {
                Ok(job) => {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Worker {} recovered from a panicking task", id);
                    }
                }
                Err(_) => {
                    debug!("Worker {} stopping", id);
                    break;
                }
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_pool_size() {
        assert_eq!(WorkerPool::new(4).unwrap().size(), 4);
        assert_eq!(WorkerPool::new(0).unwrap().size(), 1);
    }

    #[test]
    fn test_runs_all_jobs_before_shutdown_returns() {
        let mut pool = WorkerPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_millis(1));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_execute_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        assert_eq!(pool.execute(|| {}), Err(PoolShutDown));
    }

    #[test]
    fn test_execute_does_not_block_when_busy() {
        let pool = WorkerPool::new(1).unwrap();
        let gate = Arc::new(Barrier::new(2));

        let worker_gate = Arc::clone(&gate);
        pool.execute(move || {
            worker_gate.wait();
        })
        .unwrap();
        // El único worker está bloqueado; encolar más no debe bloquear
        for _ in 0..10 {
            pool.execute(|| {}).unwrap();
        }
        gate.wait();
    }

    #[test]
    fn test_worker_survives_panicking_job() {
        let mut pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.execute(|| panic!("boom")).unwrap();
        let c = Arc::clone(&counter);
        pool.execute(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jobs_run_concurrently() {
        let pool = WorkerPool::new(2).unwrap();
        let barrier = Arc::new(Barrier::new(3));

        for _ in 0..2 {
            let barrier = Arc::clone(&barrier);
            pool.execute(move || {
                barrier.wait();
            })
            .unwrap();
        }
        // Solo retorna si ambos jobs corren a la vez
        barrier.wait();
    }
}
