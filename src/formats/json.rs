//! JSON-lines sink for population snapshots.
//!
//! One snapshot per line, optionally gzip-compressed.

use crate::core::traits::SnapshotWriter;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonlCompression {
    None,
    Gzip,
}

enum JsonlSink {
    Plain(BufWriter<Box<dyn Write>>),
    Gzip(GzEncoder<BufWriter<Box<dyn Write>>>),
}

impl JsonlSink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            JsonlSink::Plain(writer) => writer,
            JsonlSink::Gzip(encoder) => encoder,
        }
    }
}

/// Line-delimited JSON writer over a file or any byte stream.
pub struct JsonlWriter {
    sink: Option<JsonlSink>,
    records: u64,
}

impl JsonlWriter {
    /// Creates (or truncates) `path`, creating parent directories as needed.
    pub fn to_path(path: impl AsRef<Path>, compression: Option<&str>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Self::from_writer(file, compression)
    }

    /// Wraps an arbitrary writer such as stdout.
    pub fn from_writer(writer: impl Write + 'static, compression: Option<&str>) -> io::Result<Self> {
        let buffered = BufWriter::new(Box::new(writer) as Box<dyn Write>);
        let sink = match parse_compression(compression)? {
            JsonlCompression::None => JsonlSink::Plain(buffered),
            JsonlCompression::Gzip => {
                JsonlSink::Gzip(GzEncoder::new(buffered, Compression::default()))
            }
        };
        Ok(Self {
            sink: Some(sink),
            records: 0,
        })
    }

    /// Number of snapshots written so far.
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl SnapshotWriter for JsonlWriter {
    fn write_snapshot(&mut self, snapshot: &Value) -> io::Result<u64> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "snapshot writer is closed",
            ));
        };
        let mut line = serde_json::to_vec(snapshot)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        line.push(b'\n');
        sink.writer().write_all(&line)?;
        self.records += 1;
        Ok(line.len() as u64)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.writer().flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.sink.take() {
            Some(JsonlSink::Plain(mut writer)) => writer.flush(),
            Some(JsonlSink::Gzip(encoder)) => {
                let mut inner = encoder.finish()?;
                inner.flush()
            }
            None => Ok(()),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn parse_compression(value: Option<&str>) -> io::Result<JsonlCompression> {
    let Some(value) = value else {
        return Ok(JsonlCompression::None);
    };
    let normalized = value.trim().to_lowercase();
    match normalized.as_str() {
        "" | "none" => Ok(JsonlCompression::None),
        "gzip" | "gz" => Ok(JsonlCompression::Gzip),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported jsonl compression: {value}"),
        )),
    }
}
