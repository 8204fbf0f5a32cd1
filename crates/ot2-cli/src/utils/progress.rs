use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ot2protocols::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders workflow progress on stderr: a spinner per phase and a bar while a
/// phase counts samples.
#[derive(Clone)]
pub struct ProgressDisplay {
    bar: Arc<Mutex<ProgressBar>>,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A display that tracks state but draws nothing, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        bar.finish_and_clear();
        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = Arc::clone(&self.bar);
        Box::new(move |event: Progress| {
            let Ok(bar) = bar.lock() else {
                warn!("Progress display lock was poisoned; skipping update.");
                return;
            };
            match event {
                Progress::PhaseStart { name } => {
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(spinner_style());
                    bar.set_message(name);
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                Progress::PhaseFinish => {
                    bar.disable_steady_tick();
                    bar.finish_with_message(format!("✓ {}", bar.message()));
                }
                Progress::TaskStart { total_steps } => {
                    bar.disable_steady_tick();
                    bar.set_length(total_steps);
                    bar.set_position(0);
                    bar.set_style(bar_style());
                }
                Progress::TaskIncrement => bar.inc(1),
                Progress::TaskFinish => {
                    if let Some(len) = bar.length() {
                        bar.set_position(len);
                    }
                }
                Progress::Message(text) => bar.println(format!("  {}", text)),
            }
        })
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<12} [{bar:30.cyan/blue}] {pos}/{len} samples")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn display_starts_finished_and_empty() {
        let display = ProgressDisplay::hidden();
        let bar = display.bar.lock().unwrap();
        assert_eq!(bar.length(), Some(0));
        assert!(bar.is_finished());
    }

    #[test]
    fn phase_and_task_events_drive_the_bar() {
        let display = ProgressDisplay::hidden();
        let callback = display.callback();

        callback(Progress::PhaseStart { name: "Planning" });
        {
            let bar = display.bar.lock().unwrap();
            assert_eq!(bar.message(), "Planning");
            assert!(!bar.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::TaskIncrement);
        assert_eq!(display.bar.lock().unwrap().position(), 1);

        callback(Progress::TaskFinish);
        assert_eq!(display.bar.lock().unwrap().position(), 4);

        callback(Progress::PhaseFinish);
        let bar = display.bar.lock().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "✓ Planning");
    }

    #[test]
    fn callback_can_be_used_from_another_thread() {
        let display = ProgressDisplay::hidden();
        let callback = display.callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Merging" });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(display.bar.lock().unwrap().is_finished());
    }
}
