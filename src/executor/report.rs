pub const ERROR_TITLE: &str = "Error loading provider";

/// User-facing notification sink, e.g. a dialog or the terminal.
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, title: &str, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report_error(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}
