use std::io;
use std::sync::{Arc, Mutex};

use slog::{Drain, Logger};
use slog_async::Async;
use slog_term::{CompactFormat, FullFormat, PlainDecorator, PlainSyncDecorator};

/// Loggers for tests
pub struct TestLogger;

impl TestLogger {
    fn from_writer<W: io::Write + Send + 'static>(writer: W) -> Logger {
        let decorator = PlainDecorator::new(writer);
        let drain = CompactFormat::new(decorator).build().fuse();
        let drain = Async::new(drain).build().fuse();
        Logger::root(Arc::new(drain), slog::o!())
    }

    /// Logger writing to the test output, captured by the test harness.
    pub fn stdout() -> Logger {
        Self::from_writer(slog_term::TestStdoutWriter)
    }

    /// Synchronous logger writing to memory, with an inspector to assert on what was logged.
    pub fn memory() -> (Logger, MemoryLogsInspector) {
        let buffer = SharedBuffer::default();
        let decorator = PlainSyncDecorator::new(buffer.clone());
        let drain = FullFormat::new(decorator).build().fuse();

        (
            Logger::root(drain, slog::o!()),
            MemoryLogsInspector { buffer },
        )
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::other("test log buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read access to the logs of a [TestLogger::memory] logger.
pub struct MemoryLogsInspector {
    buffer: SharedBuffer,
}

impl MemoryLogsInspector {
    /// Everything logged so far
    pub fn logs(&self) -> String {
        self.buffer
            .0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    /// Does any log line contain the given pattern
    pub fn contains_log(&self, pattern: &str) -> bool {
        self.logs().contains(pattern)
    }

    /// Number of log lines containing the given pattern
    pub fn count_log(&self, pattern: &str) -> usize {
        self.logs()
            .lines()
            .filter(|line| line.contains(pattern))
            .count()
    }
}
