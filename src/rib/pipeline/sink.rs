//! Sink stage
//!
//!     The last link of every pipeline. Renders the request to its final line,
//!     prefixed by its indentation, and hands it to a [`Destination`]. The sink is the
//!     only holder of the destination and releases it when the pipeline closes.
//!
//! Session Control
//!
//!     `Begin "<name>"` and `End` are not written. A [`FileDestination`] uses them to
//!     create and finish the named archive; other destinations ignore them.
//!     Debug-barrier requests are dropped here as well.

use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::Stage;
use crate::rib::request::{Request, BEGIN, END};
use crate::rib::values::Value;
use std::any::Any;
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Where finished lines go
pub trait Destination {
    /// Start a named archive
    fn open(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Append one rendered line, terminator included
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Finish the current archive, keeping the destination usable
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the destination
    fn close(&mut self) -> Result<()>;
}

/// Any `io::Write`, flushed and dropped on close
#[derive(Debug)]
pub struct WriterDestination<W: Write> {
    out: Option<W>,
}

impl<W: Write> WriterDestination<W> {
    pub fn new(out: W) -> Self {
        WriterDestination { out: Some(out) }
    }
}

impl<W: Write> Destination for WriterDestination<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let out = self.out.as_mut().ok_or(RibError::PipelineClosed)?;
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(())
    }
}

/// Archives created as files under a directory, one per `Begin`
#[derive(Debug)]
pub struct FileDestination {
    directory: PathBuf,
    current: Option<(PathBuf, BufWriter<File>)>,
}

impl FileDestination {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        FileDestination {
            directory: directory.as_ref().to_path_buf(),
            current: None,
        }
    }

    /// Path of the archive currently open, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(path, _)| path.as_path())
    }
}

impl Destination for FileDestination {
    fn open(&mut self, name: &str) -> Result<()> {
        self.finish()?;
        let path = self.directory.join(name);
        let file = File::create(&path)?;
        debug!(path = %path.display(), "Opened archive");
        self.current = Some((path, BufWriter::new(file)));
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let (_, out) = self.current.as_mut().ok_or_else(|| {
            RibError::BadArgument("no archive is open; write Begin first".to_string())
        })?;
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some((path, mut out)) = self.current.take() {
            out.flush()?;
            debug!(path = %path.display(), "Closed archive");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.finish()
    }
}

/// In-memory destination whose contents stay readable through a clone
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct Sink<D: Destination> {
    destination: D,
    indent_unit: String,
    lines: usize,
}

impl<D: Destination> Sink<D> {
    pub fn new(destination: D) -> Self {
        Sink {
            destination,
            indent_unit: "    ".to_string(),
            lines: 0,
        }
    }

    /// String repeated once per nesting level
    pub fn with_indent(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    fn render(&self, request: &Request) -> String {
        let mut line = self.indent_unit.repeat(request.indent);
        line.push_str(&request.serialise());
        line.push('\n');
        line
    }
}

impl<W: Write> Sink<WriterDestination<W>> {
    pub fn writer(out: W) -> Self {
        Sink::new(WriterDestination::new(out))
    }
}

impl Sink<WriterDestination<SharedBuffer>> {
    /// Sink into memory, plus a handle for reading what it wrote
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (Sink::writer(buffer.clone()), buffer)
    }
}

impl Sink<FileDestination> {
    pub fn file(directory: impl AsRef<Path>) -> Self {
        Sink::new(FileDestination::new(directory))
    }
}

impl<D: Destination + 'static> Stage for Sink<D> {
    fn name(&self) -> &'static str {
        "sink"
    }

    fn process(&mut self, request: Request) -> Result<Request> {
        if request.is_debug_barrier() {
            return Ok(request);
        }
        if request.name == BEGIN {
            let name = match request.required.first() {
                Some(Value::String(s) | Value::Token(s) | Value::Name(s)) => s.clone(),
                _ => {
                    return Err(RibError::BadArgument(
                        "Begin requires an archive name".to_string(),
                    ))
                }
            };
            self.destination.open(&name)?;
            return Ok(request);
        }
        if request.name == END {
            self.destination.finish()?;
            return Ok(request);
        }

        let line = self.render(&request);
        self.destination.write_line(&line)?;
        self.lines += 1;
        Ok(request)
    }

    fn close(&mut self) -> Result<()> {
        debug!(lines = self.lines, "Closing sink");
        self.destination.close()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
