//! Plain-text sample records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::OutputError;
use crate::input::SampleLocation;
use crate::model::Engine;
use crate::time::SimTime;

/// Writes one line per sample location: `time L longitude density`.
pub struct SampleWriter<W: Write> {
    sink: W,
    records: usize,
}

impl SampleWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = File::create(path).map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> SampleWriter<W> {
    /// Wraps `sink` and writes the column header.
    pub fn new(mut sink: W) -> Result<Self, OutputError> {
        writeln!(sink, "# time L longitude_deg density_cm3")?;
        Ok(Self { sink, records: 0 })
    }

    /// Samples `engine` at every location and writes the values stamped with `time`.
    pub fn write_samples<E: Engine + ?Sized>(
        &mut self,
        time: SimTime,
        locations: &[SampleLocation],
        engine: &E,
    ) -> Result<(), OutputError> {
        let stamp = time.format("%Y-%m-%dT%H:%M:%SZ");
        for loc in locations {
            let den = engine.sample_density(loc.l, loc.longitude_deg);
            writeln!(
                self.sink,
                "{} {:.3} {:.2} {:.6e}",
                stamp, loc.l, loc.longitude_deg, den
            )?;
        }
        self.records += 1;
        Ok(())
    }

    /// Number of sample records (one per emission time) written.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(mut self) -> Result<W, OutputError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PotentialModel;
    use crate::time::from_ymdh;
    use std::io;

    /// Engine stub whose density equals `L * 100 + longitude`.
    struct LinearEngine;

    impl Engine for LinearEngine {
        fn advance(&mut self, _dt: f64) {}
        fn set_driving_parameter(&mut self, _model: PotentialModel, _values: &[f64]) {}
        fn set_clock(&mut self, _time: SimTime) {}
        fn write_header(&self, _sink: &mut dyn Write) -> io::Result<()> {
            Ok(())
        }
        fn write_state(&self, _sink: &mut dyn Write) -> io::Result<()> {
            Ok(())
        }
        fn sample_density(&self, l: f64, longitude_deg: f64) -> f64 {
            l * 100.0 + longitude_deg
        }
    }

    #[test]
    fn test_write_samples_lines() {
        let mut writer = SampleWriter::new(Vec::new()).unwrap();
        let locations = [
            SampleLocation { l: 4.0, longitude_deg: 0.0 },
            SampleLocation { l: 6.0, longitude_deg: 90.0 },
        ];
        let t = from_ymdh(2001, 3, 31, 12).unwrap();
        writer.write_samples(t, &locations, &LinearEngine).unwrap();
        assert_eq!(writer.records(), 1);

        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[1], "2001-03-31T12:00:00Z 4.000 0.00 4.000000e2");
        assert_eq!(lines[2], "2001-03-31T12:00:00Z 6.000 90.00 6.900000e2");
    }
}
