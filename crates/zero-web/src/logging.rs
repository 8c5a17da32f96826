//! Browser console logging

use std::io;

use tracing_subscriber::fmt::MakeWriter;

/// Install a `tracing` subscriber that writes to the browser console
pub fn init() {
    let result = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(ConsoleWriter)
        .without_time()
        .with_target(true)
        .try_init();

    if result.is_err() {
        web_sys::console::warn_1(&"tracing subscriber already installed".into());
    }
}

/// Buffers one formatted event and flushes it as a single `console.log`
#[derive(Default)]
pub struct ConsoleWriter;

pub struct ConsoleLine(Vec<u8>);

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine(Vec::with_capacity(128))
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.0);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
    }
}
