//! Conflict policy for generated paths that already exist.
//!
//! `merge` is a textual append: the new content is written in full followed
//! by [`MERGE_MARKER`] on its own line. It never drops new content and never
//! attempts to combine it with what was there before; reconciling the two is
//! left to a human.

use crate::domain::value_objects::ConflictStrategy;

/// Appended after the new content when the `merge` strategy applies.
pub const MERGE_MARKER: &str =
    "<<<<<<< kiln: merged output; reconcile with previous version >>>>>>>";

/// What the writer should do with a target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Write,
    Skip,
}

/// Outcome of applying a [`ConflictStrategy`] to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    pub action: WriteAction,
    /// Content to write. Empty when `action` is `Skip`.
    pub final_content: String,
    /// `true` when the path already existed.
    pub conflicted: bool,
}

impl ConflictResolution {
    pub fn should_write(&self) -> bool {
        self.action == WriteAction::Write
    }
}

impl ConflictStrategy {
    /// Decide what happens to `new_content` given whether its path exists.
    ///
    /// A path that does not exist is always written verbatim, whatever the
    /// strategy.
    pub fn apply(self, exists: bool, new_content: String) -> ConflictResolution {
        if !exists {
            return ConflictResolution {
                action: WriteAction::Write,
                final_content: new_content,
                conflicted: false,
            };
        }

        match self {
            Self::Skip => ConflictResolution {
                action: WriteAction::Skip,
                final_content: String::new(),
                conflicted: true,
            },
            Self::Overwrite => ConflictResolution {
                action: WriteAction::Write,
                final_content: new_content,
                conflicted: true,
            },
            Self::Merge => ConflictResolution {
                action: WriteAction::Write,
                final_content: with_merge_marker(new_content),
                conflicted: true,
            },
        }
    }
}

fn with_merge_marker(mut content: String) -> String {
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(MERGE_MARKER);
    content.push('\n');
    content
}
