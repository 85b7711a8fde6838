//! The one-line progress display written to stderr.

use adgen_poller::events::JobEvent;

/// Progress shown while following one job.
///
/// Shows the higher of the real and cosmetic percentages. A completed
/// job always shows 100.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    real: u8,
    cosmetic: u8,
    step: Option<String>,
}

impl ProgressLine {
    /// Fold in an event for the followed job. Returns `true` once the
    /// job has reached a terminal event.
    pub fn apply(&mut self, event: JobEvent) -> bool {
        match event {
            JobEvent::Progress {
                percent,
                current_step,
                ..
            } => {
                self.real = self.real.max(percent);
                if current_step.is_some() {
                    self.step = current_step;
                }
                false
            }
            JobEvent::Completed { .. } => {
                self.real = 100;
                true
            }
            JobEvent::Failed { .. } | JobEvent::Cancelled { .. } => true,
        }
    }

    pub fn set_cosmetic(&mut self, value: u8) {
        self.cosmetic = value;
    }

    pub fn percent(&self) -> u8 {
        self.real.max(self.cosmetic)
    }

    /// The line to print, starting with a carriage return so each
    /// render overwrites the previous one.
    pub fn render(&self) -> String {
        format!(
            "\r{:>3}% {}",
            self.percent(),
            self.step.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adgen_core::job::JobKind;
    use serde_json::json;

    fn progress(percent: u8, step: Option<&str>) -> JobEvent {
        JobEvent::Progress {
            operation: JobKind::Scrape,
            job_id: "s-1".into(),
            percent,
            current_step: step.map(str::to_string),
        }
    }

    #[test]
    fn shows_higher_of_real_and_cosmetic() {
        let mut line = ProgressLine::default();
        line.set_cosmetic(30);
        assert!(!line.apply(progress(10, Some("Fetching page"))));
        assert_eq!(line.render(), "\r 30% Fetching page");

        assert!(!line.apply(progress(55, None)));
        assert_eq!(line.render(), "\r 55% Fetching page");
    }

    #[test]
    fn completion_snaps_to_100() {
        let mut line = ProgressLine::default();
        line.set_cosmetic(41);
        line.apply(progress(55, Some("Rendering")));

        let done = line.apply(JobEvent::Completed {
            operation: JobKind::Scrape,
            job_id: "s-1".into(),
            result: json!({"url": "https://cdn.example.com/v.mp4"}),
        });

        assert!(done);
        assert_eq!(line.percent(), 100);
        assert_eq!(line.render(), "\r100% Rendering");
    }

    #[test]
    fn failure_and_cancellation_end_without_snapping() {
        let mut failed = ProgressLine::default();
        failed.set_cosmetic(95);
        assert!(failed.apply(JobEvent::Failed {
            operation: JobKind::BulkAds,
            job_id: "a-1".into(),
            error: "Render crashed".into(),
            timed_out: false,
        }));
        assert_eq!(failed.percent(), 95);

        let mut cancelled = ProgressLine::default();
        assert!(cancelled.apply(JobEvent::Cancelled {
            operation: JobKind::BulkAds,
            job_id: "a-1".into(),
        }));
        assert_eq!(cancelled.percent(), 0);
    }
}
