//! Gzip-compressed full-state output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::model::Engine;
use crate::time::{time_fields, SimTime};

/// Size of the timestamp that precedes each state record.
pub const TIME_HEADER_BYTES: usize = 6 * 4;

/// Errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot create output file '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes the engine grid header once, then timestamped state records.
///
/// Each record is six little-endian `i32` values
/// (`year month day hour minute second`) followed by the engine state.
pub struct StateWriter<W: Write> {
    encoder: GzEncoder<W>,
    records: usize,
}

impl StateWriter<BufWriter<File>> {
    /// Creates `path` and writes the grid header of `engine`.
    pub fn create<E: Engine + ?Sized>(path: &Path, engine: &E) -> Result<Self, OutputError> {
        let file = File::create(path).map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufWriter::new(file), engine)
    }
}

impl<W: Write> StateWriter<W> {
    /// Wraps `inner` in a best-compression gzip stream and writes the grid header.
    pub fn new<E: Engine + ?Sized>(inner: W, engine: &E) -> Result<Self, OutputError> {
        let mut encoder = GzEncoder::new(inner, Compression::best());
        engine.write_header(&mut encoder)?;
        Ok(Self {
            encoder,
            records: 0,
        })
    }

    /// Appends one state record stamped with `time`.
    pub fn write_record<E: Engine + ?Sized>(
        &mut self,
        time: SimTime,
        engine: &E,
    ) -> Result<(), OutputError> {
        for field in time_fields(time) {
            self.encoder.write_all(&field.to_le_bytes())?;
        }
        engine.write_state(&mut self.encoder)?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Finishes the gzip stream and returns the inner writer.
    pub fn finish(self) -> Result<W, OutputError> {
        let mut inner = self.encoder.finish()?;
        inner.flush()?;
        Ok(inner)
    }
}

/// Decodes a record timestamp written by [`StateWriter::write_record`].
pub fn read_time_header(bytes: &[u8]) -> Option<[i32; 6]> {
    if bytes.len() < TIME_HEADER_BYTES {
        return None;
    }
    let mut fields = [0i32; 6];
    for (i, chunk) in bytes[..TIME_HEADER_BYTES].chunks_exact(4).enumerate() {
        fields[i] = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PotentialModel;
    use crate::time::from_ymdh;
    use flate2::read::GzDecoder;
    use std::io::{self, Read};
    use tempfile::tempdir;

    /// Engine stub with a fixed header and a three-value state.
    struct FixedEngine;

    impl Engine for FixedEngine {
        fn advance(&mut self, _dt: f64) {}
        fn set_driving_parameter(&mut self, _model: PotentialModel, _values: &[f64]) {}
        fn set_clock(&mut self, _time: SimTime) {}

        fn write_header(&self, sink: &mut dyn Write) -> io::Result<()> {
            sink.write_all(b"HDR!")
        }

        fn write_state(&self, sink: &mut dyn Write) -> io::Result<()> {
            for v in [1.0f32, 2.0, 3.0] {
                sink.write_all(&v.to_le_bytes())?;
            }
            Ok(())
        }

        fn sample_density(&self, _l: f64, _longitude_deg: f64) -> f64 {
            0.0
        }
    }

    fn decode(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_header_then_records() {
        let mut writer = StateWriter::new(Vec::new(), &FixedEngine).unwrap();
        let t = from_ymdh(2001, 3, 31, 6).unwrap();
        writer.write_record(t, &FixedEngine).unwrap();
        writer.write_record(t, &FixedEngine).unwrap();
        assert_eq!(writer.records(), 2);

        let data = decode(&writer.finish().unwrap());
        let record_len = TIME_HEADER_BYTES + 12;
        assert_eq!(data.len(), 4 + 2 * record_len);
        assert_eq!(&data[..4], b"HDR!");
        assert_eq!(read_time_header(&data[4..]), Some([2001, 3, 31, 6, 0, 0]));

        let first_value = &data[4 + TIME_HEADER_BYTES..4 + TIME_HEADER_BYTES + 4];
        assert_eq!(f32::from_le_bytes(first_value.try_into().unwrap()), 1.0);
    }

    #[test]
    fn test_create_writes_gzip_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.dat");

        let writer = StateWriter::create(&path, &FixedEngine).unwrap();
        writer.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert_eq!(decode(&bytes), b"HDR!");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.dat");
        assert!(matches!(
            StateWriter::create(&path, &FixedEngine),
            Err(OutputError::Create { .. })
        ));
    }

    #[test]
    fn test_read_time_header_too_short() {
        assert_eq!(read_time_header(&[0u8; 10]), None);
    }
}
