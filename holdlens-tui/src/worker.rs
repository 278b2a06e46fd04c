//! Background worker thread: every service request runs here.
//!
//! The main thread sends store effects; the worker executes each on a private
//! rayon pool and sends the completion action back. Requests for different
//! names run concurrently up to the pool size.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, info};

use holdlens_core::api::DashboardApi;
use holdlens_core::effects::execute;
use holdlens_core::store::{Action, Effect};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Execute(Effect),
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Completed(Action),
}

/// Spawn the background worker thread with a pool of `threads` request slots.
pub fn spawn_worker(
    api: Arc<dyn DashboardApi>,
    threads: usize,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> Result<JoinHandle<()>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("holdlens-request-{i}"))
        .build()
        .context("failed to build request pool")?;

    thread::Builder::new()
        .name("holdlens-worker".into())
        .spawn(move || worker_loop(api, pool, rx, tx))
        .context("failed to spawn worker thread")
}

fn worker_loop(
    api: Arc<dyn DashboardApi>,
    pool: rayon::ThreadPool,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    info!(threads = pool.current_num_threads(), "worker started");
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Execute(effect)) => {
                debug!(?effect, "executing");
                let api = Arc::clone(&api);
                let tx = tx.clone();
                pool.spawn(move || {
                    let action = execute(api.as_ref(), effect);
                    // The UI may already be gone during shutdown.
                    let _ = tx.send(WorkerResponse::Completed(action));
                });
            }
        }
    }
    info!("worker stopped");
}
