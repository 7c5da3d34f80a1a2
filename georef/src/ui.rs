//! Terminal UI: logging and progress bars.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Application UI state.
#[derive(Clone)]
pub struct Ui {
    multi_progress: MultiProgress,
}

impl Ui {
    /// Set up logging and progress bars. Call this once, at startup.
    pub fn init() -> Ui {
        // Logging goes straight to stderr, so messages may briefly overlap a
        // progress bar. Set `RUST_LOG` to see more than warnings.
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();
        Ui {
            multi_progress: MultiProgress::new(),
        }
    }

    /// A UI which never draws anything, for tests and for output that is
    /// being piped somewhere.
    pub fn hidden() -> Ui {
        Ui {
            multi_progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Create a new progress bar with default settings.
    pub fn new_progress_bar(&self, len: u64) -> ProgressBar {
        let pb = ProgressBar::new(len).with_style(default_progress_style());
        self.multi_progress.add(pb)
    }
}

pub(crate) fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {msg:20} {pos:>4}/{len:4} {elapsed_precise} {wide_bar:.cyan/blue} {eta_precise}")
        .expect("bad progress bar template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_progress_bars_count() {
        let ui = Ui::hidden();
        let pb = ui.new_progress_bar(3);
        pb.inc(2);
        assert_eq!(2, pb.position());
        assert_eq!(Some(3), pb.length());
    }
}
