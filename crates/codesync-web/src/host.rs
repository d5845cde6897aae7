//! Host thread executor
//!
//! The host document may only be touched from one thread. `HostExecutor`
//! owns the [`ComponentApplier`] on a dedicated thread and runs the jobs it
//! receives strictly in arrival order; async callers hold a cheap
//! [`HostHandle`] and await the reply.

use std::thread::{self, JoinHandle};

use codesync_core::{CodeSyncError, ComponentApplier};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Queue depth before senders wait
const QUEUE_CAPACITY: usize = 64;

/// Failure to run a job on the host thread
#[derive(Error, Debug)]
pub enum HostError {
    #[error("host executor is not running")]
    Stopped,

    #[error(transparent)]
    Apply(#[from] CodeSyncError),
}

enum HostJob {
    Apply {
        target: String,
        code: String,
        reply: oneshot::Sender<codesync_core::Result<bool>>,
    },
    ReadSource {
        target: String,
        reply: oneshot::Sender<codesync_core::Result<Option<String>>>,
    },
    Shutdown,
}

/// Sender side of the host job queue
#[derive(Clone)]
pub struct HostHandle {
    tx: mpsc::Sender<HostJob>,
}

impl HostHandle {
    /// Hand cleaned code to the applier and wait for the outcome
    pub async fn apply(&self, target: impl Into<String>, code: impl Into<String>) -> Result<bool, HostError> {
        let (reply, rx) = oneshot::channel();
        self.submit(HostJob::Apply {
            target: target.into(),
            code: code.into(),
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| HostError::Stopped)??)
    }

    /// Read the current source of a component
    pub async fn read_source(&self, target: impl Into<String>) -> Result<Option<String>, HostError> {
        let (reply, rx) = oneshot::channel();
        self.submit(HostJob::ReadSource {
            target: target.into(),
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| HostError::Stopped)??)
    }

    async fn submit(&self, job: HostJob) -> Result<(), HostError> {
        self.tx.send(job).await.map_err(|_| HostError::Stopped)
    }
}

/// Dedicated thread owning the component applier
pub struct HostExecutor {
    handle: HostHandle,
    thread: Option<JoinHandle<()>>,
}

impl HostExecutor {
    /// Start the host thread
    pub fn spawn<A>(applier: A) -> std::io::Result<Self>
    where
        A: ComponentApplier + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let thread = thread::Builder::new()
            .name("codesync-host".to_string())
            .spawn(move || run(applier, rx))?;

        info!("Host executor started");
        Ok(Self {
            handle: HostHandle { tx },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Stop after every job queued so far has run
    pub async fn shutdown(mut self) {
        if self.handle.tx.send(HostJob::Shutdown).await.is_err() {
            debug!("Host thread already stopped");
        }
        if let Some(thread) = self.thread.take() {
            match tokio::task::spawn_blocking(move || thread.join()).await {
                Ok(Ok(())) => info!("Host executor stopped"),
                Ok(Err(_)) => error!("Host thread panicked"),
                Err(e) => error!("Failed to join host thread: {e}"),
            }
        }
    }
}

fn run<A: ComponentApplier>(mut applier: A, mut rx: mpsc::Receiver<HostJob>) {
    while let Some(job) = rx.blocking_recv() {
        match job {
            HostJob::Apply {
                target,
                code,
                reply,
            } => {
                debug!("Applying {} bytes to component '{target}'", code.len());
                let _ = reply.send(applier.apply_source(&target, &code));
            }
            HostJob::ReadSource { target, reply } => {
                let _ = reply.send(applier.read_source(&target));
            }
            HostJob::Shutdown => break,
        }
    }
}
