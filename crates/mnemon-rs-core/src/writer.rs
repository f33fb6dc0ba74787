//! Background memory writes.
//!
//! A bounded queue feeding one worker task replaces thread-per-write
//! fire-and-forget: the request path only enqueues, the worker owns all
//! write I/O, and shutdown has an explicit drain policy.

use crate::orchestrator::MemoryOrchestrator;
use crate::scope::ScopeArgs;
use log::{debug, warn};
use mnemon_rs_protocol::ChatMessage;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// One fire-and-forget write of raw messages under a scope.
#[derive(Debug, Clone)]
pub struct WriteJob {
    /// Messages to persist.
    pub messages: Vec<ChatMessage>,
    /// Scope the messages belong to.
    pub scope: ScopeArgs,
}

/// Queue of background memory writes with a single worker task.
pub struct MemoryWriter {
    sender: Mutex<Option<mpsc::Sender<WriteJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryWriter {
    /// Spawn the worker task over a bounded queue of the given depth.
    pub fn spawn(orchestrator: Arc<MemoryOrchestrator>, queue_depth: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<WriteJob>(queue_depth.max(1));
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                debug!(
                    "processing background write (messages={})",
                    job.messages.len()
                );
                if let Err(err) = orchestrator.add(&job.messages, &job.scope).await {
                    warn!("background memory write failed (err={err})");
                }
            }
            debug!("memory writer drained");
        });
        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a write without blocking.
    ///
    /// Background writes are best-effort: when the queue is full or the
    /// writer has shut down the job is dropped with a warning, never an
    /// error to the caller.
    pub fn submit(&self, job: WriteJob) {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            warn!("memory writer closed, dropping background write");
            return;
        };
        match sender.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("write queue full, dropping background write");
            }
            Err(TrySendError::Closed(_)) => {
                warn!("write queue closed, dropping background write");
            }
        }
    }

    /// Close the queue and wait for the worker to drain pending jobs.
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().take();
        drop(sender);
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryWriter, WriteJob};
    use crate::orchestrator::MemoryOrchestrator;
    use crate::scope::ScopeArgs;
    use mnemon_rs_memory::{
        EmbeddingGateway, HashEmbedder, InMemoryVectorIndex, MemoryStore, NoopGraphStore,
    };
    use mnemon_rs_protocol::ChatMessage;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn orchestrator() -> Arc<MemoryOrchestrator> {
        let gateway =
            EmbeddingGateway::new(Arc::new(HashEmbedder::new(16)), None).expect("gateway");
        let store = MemoryStore::new(gateway, Arc::new(InMemoryVectorIndex::new()));
        Arc::new(MemoryOrchestrator::new(store, Arc::new(NoopGraphStore::new())))
    }

    #[tokio::test]
    async fn shutdown_drains_submitted_jobs() {
        let orchestrator = orchestrator();
        let writer = MemoryWriter::spawn(orchestrator.clone(), 8);

        writer.submit(WriteJob {
            messages: vec![ChatMessage::user("remember this")],
            scope: ScopeArgs::for_user("u1"),
        });
        writer.shutdown().await;

        let records = orchestrator
            .get_all(&ScopeArgs::for_user("u1"))
            .await
            .expect("get_all");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "remember this");
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_dropped_silently() {
        let orchestrator = orchestrator();
        let writer = MemoryWriter::spawn(orchestrator.clone(), 8);
        writer.shutdown().await;

        writer.submit(WriteJob {
            messages: vec![ChatMessage::user("too late")],
            scope: ScopeArgs::for_user("u1"),
        });

        let records = orchestrator
            .get_all(&ScopeArgs::for_user("u1"))
            .await
            .expect("get_all");
        assert_eq!(records, Vec::new());
    }

    #[tokio::test]
    async fn scopeless_jobs_fail_in_the_background_without_surfacing() {
        let orchestrator = orchestrator();
        let writer = MemoryWriter::spawn(orchestrator.clone(), 8);

        writer.submit(WriteJob {
            messages: vec![ChatMessage::user("unscoped")],
            scope: ScopeArgs::default(),
        });
        writer.shutdown().await;

        let records = orchestrator
            .get_all(&ScopeArgs::for_user("u1"))
            .await
            .expect("get_all");
        assert_eq!(records, Vec::new());
    }
}
