//! The narrow interfaces the pipeline calls out through, and the
//! implementations the `fencrypt` binary plugs in.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::io::{FileData, create_file, read_file};
use crate::error::{PipelineError, Result};
use crate::report;
use crate::tally::CountReport;

/// Pull-based input. `Ok(None)` means the input is exhausted.
pub trait ByteSource: Send {
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Push-based output.
pub trait ByteSink: Send {
    fn emit(&mut self, b: u8) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Receives the tallies of every completed window: one per reset, plus the
/// final one at shutdown.
pub trait CountReporter: Send {
    fn report(&mut self, report: &CountReport) -> io::Result<()>;
}

/// Yields a fully loaded input one byte at a time.
pub struct FileSource {
    data: FileData,
    pos: usize,
}

impl FileSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        read_file(path).map(Self::from)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<FileData> for FileSource {
    fn from(data: FileData) -> Self {
        Self { data, pos: 0 }
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(v: Vec<u8>) -> Self {
        Self::from(FileData::from(v))
    }
}

impl ByteSource for FileSource {
    #[inline]
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }
}

/// Buffered pull from any reader (pipes, sockets, stdin).
pub struct ReaderSource<R> {
    reader: BufReader<R>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }
}

impl<R: Read + Send> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let b = buf[0];
                    self.reader.consume(1);
                    return Ok(Some(b));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Buffered push into any writer.
pub struct WriterSink<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::with_capacity(64 * 1024, out),
        }
    }

    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }
}

impl<W: Write + Send> ByteSink for WriterSink<W> {
    #[inline]
    fn emit(&mut self, b: u8) -> io::Result<()> {
        self.out.write_all(&[b])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn emit(&mut self, b: u8) -> io::Result<()> {
        self.push(b);
        Ok(())
    }
}

/// Writes each report as log text (see [`report::render`]).
pub struct LogReporter<W: Write> {
    out: W,
}

impl<W: Write> LogReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> CountReporter for LogReporter<W> {
    fn report(&mut self, report: &CountReport) -> io::Result<()> {
        report::render(report, &mut self.out)?;
        self.out.flush()
    }
}

/// Keeps every report in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    reports: Arc<Mutex<Vec<CountReport>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<CountReport> {
        self.reports.lock().clone()
    }
}

impl CountReporter for MemoryReporter {
    fn report(&mut self, report: &CountReport) -> io::Result<()> {
        self.reports.lock().push(report.clone());
        Ok(())
    }
}

/// The three streams of one `fencrypt` invocation.
pub struct Streams {
    pub source: FileSource,
    pub sink: WriterSink<File>,
    pub reporter: LogReporter<BufWriter<File>>,
}

impl Streams {
    /// Open the input for reading and create/truncate the output and log.
    pub fn open(input: &Path, output: &Path, log: &Path) -> Result<Self> {
        let open_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| PipelineError::Open { path, source }
        };
        let source = FileSource::open(input).map_err(open_err(input))?;
        let sink = create_file(output).map_err(open_err(output))?;
        let log = create_file(log).map_err(open_err(log))?;
        Ok(Self {
            source,
            sink: WriterSink::new(sink),
            reporter: LogReporter::new(BufWriter::new(log)),
        })
    }
}
