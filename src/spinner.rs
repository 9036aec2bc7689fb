use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use colored::Colorize;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const INTERVAL: Duration = Duration::from_millis(80);
const MAX_LABEL: usize = 60;

/// Terminal progress indicator drawn on stderr from a background thread.
///
/// The animation stops when [`Spinner::finish`] is called or when the value
/// is dropped, whichever comes first, so an early `?` return never leaves
/// the thread running.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    label: String,
}

impl Spinner {
    /// Start animating. When stderr is not a terminal nothing is drawn.
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let running = Arc::new(AtomicBool::new(true));

        let handle = io::stderr().is_terminal().then(|| {
            let running = Arc::clone(&running);
            let text = truncate(&label).to_string();
            thread::spawn(move || {
                let mut i = 0;
                while running.load(Ordering::Relaxed) {
                    let frame = FRAMES[i % FRAMES.len()];
                    eprint!("\r\x1B[2K{} {}", frame.cyan(), text.dimmed());
                    let _ = io::stderr().flush();
                    thread::sleep(INTERVAL);
                    i += 1;
                }
                eprint!("\r\x1B[2K");
                let _ = io::stderr().flush();
            })
        });

        Self {
            running,
            handle,
            label,
        }
    }

    /// Stop the animation and wait for the drawing thread to exit.
    pub fn finish(&mut self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::trace!(label = %self.label, "spinner stopped");
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

fn truncate(label: &str) -> &str {
    match label.char_indices().nth(MAX_LABEL) {
        Some((idx, _)) => &label[..idx],
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_is_idempotent() {
        let mut spinner = Spinner::start("Running eslint");
        assert!(spinner.running.load(Ordering::Relaxed));
        spinner.finish();
        assert!(!spinner.running.load(Ordering::Relaxed));
        spinner.finish();
    }

    #[test]
    fn test_stops_on_early_return() {
        fn failing(flag: &mut Option<Arc<AtomicBool>>) -> Result<(), ()> {
            let spinner = Spinner::start("work");
            *flag = Some(Arc::clone(&spinner.running));
            Err(())
        }
        let mut flag = None;
        assert!(failing(&mut flag).is_err());
        assert!(!flag.unwrap().load(Ordering::Relaxed));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let long = "é".repeat(100);
        assert_eq!(truncate(&long).chars().count(), MAX_LABEL);
        assert_eq!(truncate("short"), "short");
    }
}
