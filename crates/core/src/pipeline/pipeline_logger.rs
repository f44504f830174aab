use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples use cases from specific output mechanisms so each caller can
/// observe a run without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-stage summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and reports a summary.
///
/// Progress lines are throttled to every `throttle_frames` frames. The
/// wall clock starts at the first event, not at construction.
pub struct StdoutPipelineLogger {
    label: String,
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Option<Instant>,
    frames: usize,
}

impl StdoutPipelineLogger {
    pub fn new(label: &str, throttle_frames: usize) -> Self {
        Self {
            label: label.to_string(),
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: None,
            frames: 0,
        }
    }

    fn mark_started(&mut self) {
        self.start_time.get_or_insert_with(Instant::now);
    }

    /// Returns the formatted summary, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let wall_ms = self.start_time.map(elapsed_ms).unwrap_or(0.0);
        let mut lines = vec![format!(
            "{} summary ({} frames, {:.1}s total):",
            self.label,
            self.frames,
            wall_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({} calls)",
                durations.len()
            ));
        }

        if self.frames > 0 && wall_ms > 0.0 {
            let fps = self.frames as f64 / (wall_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new("Pipeline", 30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.mark_started();
        self.frames = current;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("{}: {current}/{total} frames ({pct:.1}%)", self.label);
        } else {
            log::info!("{}: {current} frames", self.label);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.mark_started();
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.mark_started();
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

/// Milliseconds elapsed since `start`.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
