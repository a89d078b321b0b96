//! Observable application state.
//!
//! Holds the two models the presentation layer renders: the task list
//! (append-only, positional identity) and the current knowledge
//! excerpt (last write wins). Mutation happens only on the dispatch
//! loop; readers get committed snapshots, subscribers get one typed
//! change event per mutation.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use igor_protocol::Task;

const CHANGE_BUFFER_SIZE: usize = 256;

/// One committed state mutation, for subscribers.
#[derive(Debug, Clone)]
pub enum StateChange {
    TaskAdded(Task),
    KnowledgeUpdated(String),
}

#[derive(Debug, Default)]
struct StateInner {
    tasks: Vec<Task>,
    knowledge: String,
}

/// Shared handle to the client's observable state.
#[derive(Clone)]
pub struct ApplicationState {
    inner: Arc<RwLock<StateInner>>,
    change_tx: broadcast::Sender<StateChange>,
}

impl ApplicationState {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_BUFFER_SIZE);
        Self {
            inner: Arc::new(RwLock::new(StateInner::default())),
            change_tx,
        }
    }

    /// Snapshot of the task list in receipt order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.read().await.tasks.clone()
    }

    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    /// The most recently received knowledge excerpt. Empty until the
    /// first `knowledge` message arrives.
    pub async fn knowledge(&self) -> String {
        self.inner.read().await.knowledge.clone()
    }

    /// Subscribe to committed mutations, one event each, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.change_tx.subscribe()
    }

    pub(crate) async fn push_task(&self, task: Task) {
        {
            let mut inner = self.inner.write().await;
            inner.tasks.push(task.clone());
            debug!("Task list grew to {}", inner.tasks.len());
        }
        let _ = self.change_tx.send(StateChange::TaskAdded(task));
    }

    pub(crate) async fn set_knowledge(&self, content: String) {
        self.inner.write().await.knowledge = content.clone();
        let _ = self.change_tx.send(StateChange::KnowledgeUpdated(content));
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}
