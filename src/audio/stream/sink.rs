use std::io::Write;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::common::errors::{MuxError, Result};

/// Side output receiving every decoded or encoded unit of a stream.
pub type BoxedSink = Box<dyn Write + Send>;

/// Bind-once slot for a [`BoxedSink`].
#[derive(Default)]
pub struct SinkSlot {
    sink: OnceLock<Mutex<BoxedSink>>,
}

impl SinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, sink: BoxedSink) -> Result<()> {
        self.sink
            .set(Mutex::new(sink))
            .map_err(|_| MuxError::AlreadyBound("sink"))
    }

    pub fn is_bound(&self) -> bool {
        self.sink.get().is_some()
    }

    /// Write `bytes` to the bound sink, if any.
    pub fn forward(&self, bytes: &[u8]) -> Result<()> {
        if let Some(sink) = self.sink.get() {
            sink.lock().write_all(bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{self, Write};
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Cloneable in-memory sink for assertions.
    #[derive(Clone, Default)]
    pub struct SharedSink(pub Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        pub fn bytes(&self) -> Vec<u8> {
            self.0.lock().clone()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
