//! Main-thread task queue.
//!
//! Worker tasks never touch game state. Anything a player should see is wrapped in
//! a closure and sent here; the host drains the queue from its main thread with
//! [`MainThreadQueue::run_pending`] (typically once per tick).

use log::{debug, warn};
use std::sync::Mutex;
use tokio::sync::mpsc;

pub type MainThreadTask = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable sender side, handed to worker tasks.
#[derive(Clone)]
pub struct MainThreadHandle {
    tx: mpsc::UnboundedSender<MainThreadTask>,
}

impl MainThreadHandle {
    /// Queue `task` for the next drain. Returns false if the queue is gone
    /// (the service is shutting down).
    pub fn execute<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            warn!("Main-thread queue closed; dropping task");
            return false;
        }
        true
    }
}

pub struct MainThreadQueue {
    tx: mpsc::UnboundedSender<MainThreadTask>,
    rx: Mutex<mpsc::UnboundedReceiver<MainThreadTask>>,
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainThreadQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every task queued so far, in order. Tasks queued while draining run on
    /// the next call. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<MainThreadTask> = {
            let mut rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
            let mut tasks = Vec::new();
            while let Ok(task) = rx.try_recv() {
                tasks.push(task);
            }
            tasks
        };
        let count = tasks.len();
        for task in tasks {
            task();
        }
        if count > 0 {
            debug!("Ran {} main-thread task(s)", count);
        }
        count
    }
}
