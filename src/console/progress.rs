use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

const BAR_TEMPLATE: &str = "{percent}% [{bar:40.magenta}] ETA: {eta} Speed: {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.magenta} {bytes} Speed: {msg}";

/// Progress display for one streamed download. Purely observational.
pub struct TransferProgress {
    bar: ProgressBar,
    last_update: Instant,
}

impl TransferProgress {
    pub fn new(total: Option<u64>, visible: bool) -> Self {
        let bar = match (visible, total) {
            (false, len) => ProgressBar::with_draw_target(len, ProgressDrawTarget::hidden()),
            (true, Some(len)) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("\u{2588}\u{2591}"),
                );
                pb
            }
            (true, None) => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::with_template(SPINNER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };
        Self {
            bar,
            last_update: Instant::now(),
        }
    }

    /// Records `chunk_len` more bytes and recomputes throughput from the time
    /// since the previous chunk.
    pub fn advance(&mut self, chunk_len: usize) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        if elapsed > 0.0 {
            let mb_per_sec = chunk_len as f64 / elapsed / (1024.0 * 1024.0);
            self.bar.set_message(format!("{mb_per_sec:.2} MB/s"));
        }
        self.bar.inc(chunk_len as u64);
        self.last_update = now;
    }

    pub fn finish(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
        self.bar.finish();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_still_counts() {
        let mut p = TransferProgress::new(Some(10), false);
        p.advance(4);
        p.advance(3);
        assert_eq!(p.position(), 7);
        p.finish();
    }
}
