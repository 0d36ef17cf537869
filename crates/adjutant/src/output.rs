//! Shareable text sinks for standard and error output.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use adjutant_common::mutex_lock_or_recover;
use tracing::debug;

/// A cloneable handle to a writer.
///
/// Apps hold one for standard output and one for error output; flag sets hold
/// a clone of the error sink. Clones write to the same underlying writer.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<dyn Write + Send>>,
}

impl Output {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Drops everything written to it.
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    /// Writes `text` in full. Write failures are logged and otherwise ignored:
    /// there is nowhere left to report them.
    pub fn print(&self, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut sink = mutex_lock_or_recover(&self.sink);
        if let Err(err) = sink.write_all(text.as_bytes()).and_then(|()| sink.flush()) {
            debug!(error = %err, "Failed to write output");
        }
    }

    pub fn same_sink(&self, other: &Output) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        mutex_lock_or_recover(&self.sink).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        mutex_lock_or_recover(&self.sink).flush()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

impl From<SharedBuffer> for Output {
    fn from(buffer: SharedBuffer) -> Self {
        Output::new(buffer)
    }
}

/// An in-memory writer whose clones share one buffer.
///
/// Used to capture flag defaults before deciding whether to print a section,
/// and by tests to inspect what an app wrote.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&mutex_lock_or_recover(&self.bytes)).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        mutex_lock_or_recover(&self.bytes).is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        mutex_lock_or_recover(&self.bytes).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let buffer = SharedBuffer::new();
        let out = Output::from(buffer.clone());
        let clone = out.clone();

        out.print("a");
        clone.print("b");

        assert_eq!(buffer.contents(), "ab");
        assert!(out.same_sink(&clone));
    }

    #[test]
    fn test_write_trait() {
        let buffer = SharedBuffer::new();
        let mut out = Output::from(buffer.clone());
        writeln!(out, "line {}", 1).unwrap();
        assert_eq!(buffer.contents(), "line 1\n");
    }

    #[test]
    fn test_discard_and_distinct_sinks() {
        let out = Output::discard();
        out.print("ignored");
        assert!(!out.same_sink(&Output::discard()));
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = SharedBuffer::new();
        assert!(buffer.is_empty());
        Output::from(buffer.clone()).print("");
        assert!(buffer.is_empty());
    }
}
