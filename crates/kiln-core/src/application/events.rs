//! Typed lifecycle notifications for a generation run.
//!
//! Listeners are fire-and-forget. A listener that panics is caught and
//! logged; it never aborts generation. Pipeline errors, by contrast, are
//! always fatal to the run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::domain::{
    ConflictStrategy, CreatedArtifact, GeneratedManifest, GenerationProgress, RelativePath,
    WriteAction,
};
use crate::error::KilnError;

/// Everything an observer can be told about a run.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// A step is about to run. `index` is 1-based.
    StepStart { label: String, index: usize },
    StepComplete { label: String },
    /// Snapshot taken after every completed step.
    Progress(GenerationProgress),
    /// A ledger entry was recorded (file or directory).
    FileCreated(CreatedArtifact),
    /// A target path already existed.
    Conflict {
        path: RelativePath,
        strategy: ConflictStrategy,
        action: WriteAction,
    },
    /// The run failed; `step` is the label of the step in progress, if any.
    Error {
        error: KilnError,
        step: Option<String>,
    },
    Complete(GeneratedManifest),
}

impl GenerationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StepStart { .. } => EventKind::StepStart,
            Self::StepComplete { .. } => EventKind::StepComplete,
            Self::Progress(_) => EventKind::Progress,
            Self::FileCreated(_) => EventKind::FileCreated,
            Self::Conflict { .. } => EventKind::Conflict,
            Self::Error { .. } => EventKind::Error,
            Self::Complete(_) => EventKind::Complete,
        }
    }
}

/// Discriminant of [`GenerationEvent`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StepStart,
    StepComplete,
    Progress,
    FileCreated,
    Conflict,
    Error,
    Complete,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StepStart => "step:start",
            Self::StepComplete => "step:complete",
            Self::Progress => "progress",
            Self::FileCreated => "file:created",
            Self::Conflict => "conflict",
            Self::Error => "error",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by a subscription; pass it to [`EventBus::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = dyn Fn(&GenerationEvent) + Send + Sync;

struct Registration {
    id: ListenerId,
    filter: Option<EventKind>,
    listener: Arc<Listener>,
}

/// Listener registry owned by one orchestrator.
///
/// Subscriptions survive across runs; run state does not live here.
#[derive(Default)]
pub struct EventBus {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    /// Forward every event into a channel.
    ///
    /// Events sent after the receiver is dropped are discarded.
    pub fn channel(&self) -> (ListenerId, Receiver<GenerationEvent>) {
        let (tx, rx) = mpsc::channel();
        let id = self.on_any(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut regs = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = regs.len();
        regs.retain(|r| r.id != id);
        regs.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every matching listener, in subscription order.
    pub fn emit(&self, event: &GenerationEvent) {
        let kind = event.kind();
        // Snapshot so listeners may subscribe or unsubscribe while running.
        let targets: Vec<Arc<Listener>> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.filter.is_none_or(|f| f == kind))
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in targets {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(event = %kind, "event listener panicked; ignoring");
            }
        }
    }

    fn register(&self, filter: Option<EventKind>, listener: Arc<Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                filter,
                listener,
            });
        id
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
