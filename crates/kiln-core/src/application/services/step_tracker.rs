//! Step bookkeeping and progress reporting for a run.

use tracing::debug;

use crate::{
    application::events::{EventBus, GenerationEvent},
    domain::{GenerationProgress, GenerationStatus},
    error::KilnResult,
};

#[derive(Debug, Clone, Default)]
pub struct StepTracker {
    progress: GenerationProgress,
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a run of `total_steps` and announce 0%.
    pub fn begin(&mut self, total_steps: usize, events: &EventBus) {
        self.progress = GenerationProgress::planned(total_steps);
        events.emit(&GenerationEvent::Progress(self.snapshot()));
    }

    /// Run one named step.
    ///
    /// Emits a start event, runs `work`, and on success advances the
    /// counter and emits completion plus a progress snapshot. On failure
    /// the label stays current so the caller can report where it stopped.
    pub fn step<T>(
        &mut self,
        events: &EventBus,
        label: impl Into<String>,
        work: impl FnOnce() -> KilnResult<T>,
    ) -> KilnResult<T> {
        let label = label.into();
        self.progress.current_step_label = Some(label.clone());
        events.emit(&GenerationEvent::StepStart {
            label: label.clone(),
            index: self.progress.completed_steps + 1,
        });

        let value = work()?;

        self.progress.advance();
        debug!(
            step = %label,
            completed = self.progress.completed_steps,
            total = self.progress.total_steps,
            "step complete"
        );
        events.emit(&GenerationEvent::StepComplete { label });
        events.emit(&GenerationEvent::Progress(self.snapshot()));
        Ok(value)
    }

    pub fn complete(&mut self) {
        self.progress.status = GenerationStatus::Completed;
        self.progress.percentage = 100;
        self.progress.current_step_label = None;
    }

    pub fn fail(&mut self) {
        self.progress.status = GenerationStatus::Failed;
    }

    pub fn current_step(&self) -> Option<&str> {
        self.progress.current_step_label.as_deref()
    }

    pub fn snapshot(&self) -> GenerationProgress {
        self.progress.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::events::EventKind;
    use std::sync::{Arc, Mutex};

    fn recorder(events: &EventBus) -> Arc<Mutex<Vec<GenerationEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        events.on_any(move |e| sink.lock().unwrap().push(e.clone()));
        log
    }

    #[test]
    fn successful_step_emits_start_complete_progress() {
        let events = EventBus::new();
        let log = recorder(&events);
        let mut tracker = StepTracker::new();

        tracker.begin(2, &events);
        tracker.step(&events, "one", || Ok(())).unwrap();

        let kinds: Vec<_> = log.lock().unwrap().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Progress,
                EventKind::StepStart,
                EventKind::StepComplete,
                EventKind::Progress
            ]
        );
        assert_eq!(tracker.snapshot().percentage, 50);
    }

    #[test]
    fn failed_step_keeps_label_and_count() {
        let events = EventBus::new();
        let mut tracker = StepTracker::new();
        tracker.begin(3, &events);

        let result: KilnResult<()> = tracker.step(&events, "boom", || {
            Err(ApplicationError::ContentGeneration {
                artifact: "x".into(),
                reason: "nope".into(),
            }
            .into())
        });

        assert!(result.is_err());
        assert_eq!(tracker.current_step(), Some("boom"));
        assert_eq!(tracker.snapshot().completed_steps, 0);
    }

    #[test]
    fn percentages_never_decrease() {
        let events = EventBus::new();
        let log = recorder(&events);
        let mut tracker = StepTracker::new();
        tracker.begin(7, &events);
        for i in 0..7 {
            tracker.step(&events, format!("s{i}"), || Ok(())).unwrap();
        }
        tracker.complete();

        let percentages: Vec<u8> = log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::Progress(p) => Some(p.percentage),
                _ => None,
            })
            .collect();
        assert!(percentages.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percentages.last(), Some(&100));
        assert_eq!(tracker.snapshot().status, GenerationStatus::Completed);
    }
}
