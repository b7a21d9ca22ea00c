//! Structured progress reporting for ingestion.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during ingestion.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase: "department", "parse", "chunk", "embed", "publish"
    pub phase: &'static str,

    /// Current progress (departments visited, files read, chunks embedded)
    pub current: u64,

    /// Total expected work, if known
    pub total: Option<u64>,

    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Percentage complete, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|t| {
            if t > 0 {
                (self.current as f64 / t as f64) * 100.0
            } else {
                100.0
            }
        })
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };

        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    fn emit(&self, phase: &'static str, current: u64, total: Option<u64>, message: String) {
        let Some(callback) = &self.callback else {
            return;
        };

        let event = ProgressEvent {
            phase,
            current,
            total,
            message,
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
        };

        tracing::trace!(
            phase = event.phase,
            current = event.current,
            total = ?event.total,
            message = %event.message,
            "Progress event"
        );

        callback(event);
    }

    pub fn department(&self, current: u64, total: u64, name: &str) {
        self.emit("department", current, Some(total), format!("scanning {}", name));
    }

    pub fn parse(&self, current: u64, file: &str) {
        self.emit("parse", current, None, format!("reading {}", file));
    }

    pub fn chunk(&self, current: u64, total_chunks: usize) {
        self.emit(
            "chunk",
            current,
            None,
            format!("{} chunks created", total_chunks),
        );
    }

    pub fn embed(&self, current: u64, total: u64, model: &str) {
        self.emit("embed", current, Some(total), format!("model={}", model));
    }

    pub fn publish(&self, generation: u64, chunks: usize) {
        self.emit(
            "publish",
            chunks as u64,
            Some(chunks as u64),
            format!("generation {} published", generation),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_event_format() {
        let event = ProgressEvent {
            phase: "embed",
            current: 5,
            total: Some(10),
            message: "model=trigram-v1".to_string(),
            elapsed_secs: 0.0,
        };
        let formatted = event.format_simple();
        assert_eq!(formatted, "[embed] 5/10 (50%) - model=trigram-v1");
    }

    #[test]
    fn test_progress_reporter_emit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let reporter = ProgressReporter::new(Arc::new(move |event| {
            events_clone.lock().unwrap().push(event);
        }));

        reporter.department(1, 3, "finance");
        reporter.publish(7, 42);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].phase, "department");
        assert_eq!(captured[0].current, 1);
        assert_eq!(captured[1].message, "generation 7 published");
    }

    #[test]
    fn test_noop_reporter() {
        let reporter = ProgressReporter::noop();
        reporter.parse(1, "finance/report.md");
    }
}
