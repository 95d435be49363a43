use serde::{Deserialize, Serialize};

/// Lifecycle of a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Point-in-time view of a run's progress.
///
/// `percentage` is `round(completed_steps / total_steps * 100)`, held at 99
/// until the last step finishes, or 0 before any steps are planned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationProgress {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub current_step_label: Option<String>,
    pub percentage: u8,
    pub status: GenerationStatus,
}

impl GenerationProgress {
    /// Fresh progress for a run of `total_steps` steps.
    pub fn planned(total_steps: usize) -> Self {
        Self {
            total_steps,
            status: GenerationStatus::Running,
            ..Self::default()
        }
    }

    /// Record one more finished step.
    pub fn advance(&mut self) {
        self.completed_steps = (self.completed_steps + 1).min(self.total_steps);
        self.percentage = percentage(self.completed_steps, self.total_steps);
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            GenerationStatus::Completed | GenerationStatus::Failed
        )
    }
}

fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = ((completed as f64 / total as f64) * 100.0).round() as u8;
    // Rounding alone would report 100 one step early on long runs.
    if completed < total { pct.min(99) } else { pct }
}
