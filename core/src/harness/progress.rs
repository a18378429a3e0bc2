use indicatif::{ProgressBar, ProgressStyle};

/// Visual progress for a scenario run (disabled for non-interactive runs).
pub struct RunProgress {
    bar: ProgressBar,
    enabled: bool,
}

impl RunProgress {
    pub fn new(total_steps: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let bar = ProgressBar::new(total_steps as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );
        Self { bar, enabled: true }
    }

    pub fn start_step(&self, label: &str) {
        if self.enabled {
            self.bar.set_message(label.to_string());
        }
    }

    pub fn complete_step(&self) {
        if self.enabled {
            self.bar.inc(1);
        }
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let msg = if success {
            "all steps passed"
        } else {
            "failed"
        };
        self.bar.finish_with_message(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_is_inert() {
        let progress = RunProgress::new(3, false);
        progress.start_step("mkdir");
        progress.complete_step();
        progress.finish(true);
    }
}
