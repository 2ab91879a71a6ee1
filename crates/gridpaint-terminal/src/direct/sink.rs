//! Output destinations for escape-sequence bytes.

use std::io::{self, Stdout, Write};

/// Destination receiving the canvas output.
///
/// The canvas hands each payload over in a single `write` call and never
/// waits on the sink beyond that call returning.
pub trait Sink {
    /// Write one payload.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the canvas passes it on unchanged.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Size of the destination in `(columns, rows)`, if it has one.
    fn size(&self) -> Option<(u16, u16)> {
        None
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn size(&self) -> Option<(u16, u16)> {
        (**self).size()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn size(&self) -> Option<(u16, u16)> {
        (**self).size()
    }
}

/// In-memory sink; every payload is appended.
impl Sink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// The process's standard output, sized from the controlling terminal.
#[derive(Debug)]
pub struct TerminalSink {
    out: Stdout,
}

impl TerminalSink {
    #[must_use]
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TerminalSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut lock = self.out.lock();
        lock.write_all(bytes)?;
        lock.flush()
    }

    fn size(&self) -> Option<(u16, u16)> {
        crossterm::terminal::size().ok()
    }
}

/// Adapter turning any [`io::Write`] into a sink.
///
/// Each payload is written in full and flushed. An optional fixed size can
/// be attached for writers that stand in for a terminal.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    size: Option<(u16, u16)>,
}

impl<W: Write> WriterSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, size: None }
    }

    /// Report a fixed `(columns, rows)` size.
    #[must_use]
    pub fn with_size(mut self, columns: u16, rows: u16) -> Self {
        self.size = Some((columns, rows));
        self
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    fn size(&self) -> Option<(u16, u16)> {
        self.size
    }
}
