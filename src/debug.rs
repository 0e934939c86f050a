//! Toggleable diagnostic sink for capture-library output
//!
//! Capture libraries report through a C-style logger callback; this sink is
//! where those lines (and the relay's own run-status errors) land. A single
//! process-wide flag gates all output: flipping it affects subsequent calls
//! only, nothing is buffered or replayed. Debug/info lines go to the out
//! stream, warn/error lines to the err stream. A failed write is swallowed;
//! logging must never take down the caller.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Severity of a capture-library log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Check if lines of this level route to the err stream
    pub fn is_err_stream(&self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Leveled, stream-routing log sink with a process-wide enable flag
pub struct DebugSink {
    enabled: AtomicBool,
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl DebugSink {
    /// Sink writing to the process stdout/stderr, disabled until toggled
    pub fn stdio() -> Self {
        Self::with_streams(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    /// Sink with injected streams, disabled until toggled
    pub fn with_streams(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Flip the enable flag. Takes effect for subsequent `log` calls only.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Write one line at the given level.
    ///
    /// No-op when disabled. Returns whether the line was written; a write
    /// failure yields `false` and is otherwise swallowed.
    pub fn log(&self, level: LogLevel, message: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let stream = if level.is_err_stream() {
            &self.err
        } else {
            &self.out
        };

        let mut writer = stream.lock();
        writeln!(writer, "{message}")
            .and_then(|_| writer.flush())
            .is_ok()
    }
}

/// The process-wide sink sessions use unless given their own
pub fn global_sink() -> Arc<DebugSink> {
    static GLOBAL: OnceLock<Arc<DebugSink>> = OnceLock::new();
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(DebugSink::stdio())))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory writer the test can read back
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }

        fn line_count(&self) -> usize {
            self.contents().lines().count()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("stream gone"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn buffered_sink() -> (DebugSink, SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let sink = DebugSink::with_streams(Box::new(out.clone()), Box::new(err.clone()));
        (sink, out, err)
    }

    #[test]
    fn test_disabled_produces_no_output() {
        let (sink, out, err) = buffered_sink();

        assert!(!sink.log(LogLevel::Debug, "a"));
        assert!(!sink.log(LogLevel::Info, "b"));
        assert!(!sink.log(LogLevel::Warn, "c"));
        assert!(!sink.log(LogLevel::Error, "d"));

        assert_eq!(out.line_count(), 0);
        assert_eq!(err.line_count(), 0);
    }

    #[test]
    fn test_levels_route_to_streams() {
        let (sink, out, err) = buffered_sink();
        sink.set_enabled(true);

        assert!(sink.log(LogLevel::Debug, "dbg"));
        assert!(sink.log(LogLevel::Info, "inf"));
        assert!(sink.log(LogLevel::Warn, "wrn"));
        assert!(sink.log(LogLevel::Error, "err"));

        assert_eq!(out.line_count(), 2);
        assert_eq!(err.line_count(), 2);
        assert!(out.contents().contains("dbg"));
        assert!(out.contents().contains("inf"));
        assert!(err.contents().contains("wrn"));
        assert!(err.contents().contains("err"));
    }

    #[test]
    fn test_toggle_is_not_retroactive() {
        let (sink, out, _err) = buffered_sink();

        sink.log(LogLevel::Info, "before");
        sink.set_enabled(true);
        sink.log(LogLevel::Info, "after");

        assert_eq!(out.line_count(), 1);
        assert!(out.contents().contains("after"));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let sink = DebugSink::with_streams(Box::new(FailingWriter), Box::new(FailingWriter));
        sink.set_enabled(true);

        assert!(!sink.log(LogLevel::Info, "lost"));
        assert!(!sink.log(LogLevel::Error, "also lost"));
    }

    #[test]
    fn test_global_sink_is_shared() {
        let a = global_sink();
        let b = global_sink();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
