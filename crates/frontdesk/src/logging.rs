use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Operator-facing reporting. Results print to stdout as JSON, so every
/// human-readable line lands on stderr, tagged with the scope it came
/// from.
pub fn init(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
    verbose_line("verbose output enabled");
}

pub fn info(message: impl AsRef<str>) {
    line("frontdesk", message.as_ref());
}

pub fn stage(scope: &str, message: impl AsRef<str>) {
    line(&format!("frontdesk::{scope}"), message.as_ref());
}

pub fn verbose(message: impl AsRef<str>) {
    verbose_line(message.as_ref());
}

fn verbose_line(message: &str) {
    if VERBOSE.load(Ordering::Relaxed) {
        line("frontdesk::verbose", message);
    }
}

fn line(scope: &str, message: &str) {
    eprintln!("[{scope}] {message}");
}
