//! Applies the run's conflict strategy to each target path.

use tracing::{info, warn};

use crate::{
    application::{
        events::{EventBus, GenerationEvent},
        services::writer::TransactionalWriter,
    },
    domain::{ConflictResolution, ConflictStrategy, RelativePath, WriteAction},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictResolver {
    strategy: ConflictStrategy,
}

impl ConflictResolver {
    pub fn new(strategy: ConflictStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Decide what to do with `new_content` at `path`.
    ///
    /// A conflict event is emitted whenever the path already exists,
    /// whatever the strategy decides.
    pub fn resolve(
        &self,
        writer: &TransactionalWriter<'_>,
        path: &RelativePath,
        new_content: String,
        events: &EventBus,
    ) -> ConflictResolution {
        let exists = writer.exists(path);
        let resolution = self.strategy.apply(exists, new_content);

        if resolution.conflicted {
            match resolution.action {
                WriteAction::Skip => info!(%path, "path exists; skipping"),
                WriteAction::Write => {
                    warn!(%path, strategy = %self.strategy, "path exists; replacing")
                }
            }
            events.emit(&GenerationEvent::Conflict {
                path: path.clone(),
                strategy: self.strategy,
                action: resolution.action,
            });
        }

        resolution
    }
}
