use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Callback invoked with `(completed_parts, total_parts)`.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

const BAR_TEMPLATE: &str = "[{bar:40}] {percent:>3}% ({pos}/{len}) {elapsed_precise}";

/// Renders Part completion as a single self-overwriting terminal line.
///
/// Reported counts never go down: an update below the previous one is
/// raised to it. Purely observational; nothing here affects the transfer.
pub struct ProgressReporter {
    bar: ProgressBar,
    callbacks: Vec<ProgressCallback>,
    last: Option<usize>,
    finished: bool,
}

impl ProgressReporter {
    /// Draws a `[####----]` bar on stderr.
    pub fn stderr() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#-"),
        );
        Self::with_bar(bar)
    }

    /// Tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            callbacks: Vec::new(),
            last: None,
            finished: false,
        }
    }

    /// Registers a progress callback.
    pub fn on_progress(&mut self, callback: ProgressCallback) {
        self.callbacks.push(callback);
    }

    /// Reports `completed` of `total` Parts done.
    ///
    /// Reaching `total` finalizes the line.
    pub fn update(&mut self, completed: usize, total: usize) {
        let completed = match self.last {
            Some(last) if completed < last => {
                debug!(completed, last, "ignoring backwards progress");
                last
            }
            _ => completed,
        };
        self.last = Some(completed);

        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
        for cb in &self.callbacks {
            cb(completed, total);
        }

        if total > 0 && completed >= total {
            self.finish();
        }
    }

    /// Finalizes the line, leaving the last rendering on screen.
    pub fn finish(&mut self) {
        if !self.finished {
            self.bar.finish();
            self.finished = true;
        }
    }

    /// Stops updating after a failure, leaving the bar where it stopped.
    pub fn abandon(&mut self) {
        if !self.finished {
            self.bar.abandon();
            self.finished = true;
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::hidden()
    }
}
