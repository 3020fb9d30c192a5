//! Coordinator-side trajectory history.
//!
//! [`HistoryRecorder`] buffers one position sample per occupied slot per
//! recorded timestep and hands the buffers to a [`TrajectorySink`] when
//! `history_depth` samples have accumulated, and once more at the end of
//! the run.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use orbis_core::{Body, SimError, TrajectorySink, Vec3};

// ── TrajectoryFile ─────────────────────────────────────────────────

/// Plain-text trajectory log.
///
/// The first flush truncates the file; later flushes append. Every
/// sample is written as three lines:
///
/// ```text
/// EARTH_x=149597870700.000000
/// EARTH_y=0.000000
/// EARTH_z=0.000000
/// ```
#[derive(Debug)]
pub struct TrajectoryFile {
    path: PathBuf,
    flushes: usize,
    writer: Option<BufWriter<File>>,
}

impl TrajectoryFile {
    /// A log that will be written at `path`. Nothing is opened until the
    /// first flush.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flushes: 0,
            writer: None,
        }
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, SimError> {
        if self.writer.is_none() {
            let file = if self.flushes == 0 {
                File::create(&self.path)?
            } else {
                OpenOptions::new().append(true).create(true).open(&self.path)?
            };
            self.writer = Some(BufWriter::new(file));
        }
        self.writer.as_mut().ok_or_else(|| SimError::Sink {
            reason: format!("{} is not open", self.path.display()),
        })
    }
}

impl TrajectorySink for TrajectoryFile {
    fn write_samples(&mut self, name: &str, samples: &[Vec3]) -> Result<(), SimError> {
        let w = self.writer()?;
        for s in samples {
            writeln!(w, "{name}_x={:.6}", s.x)?;
            writeln!(w, "{name}_y={:.6}", s.y)?;
            writeln!(w, "{name}_z={:.6}", s.z)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.writer()?.flush()?;
        self.writer = None;
        self.flushes += 1;
        Ok(())
    }
}

// ── HistoryRecorder ────────────────────────────────────────────────

/// Per-body position buffers with a shared sample index.
pub struct HistoryRecorder {
    depth: usize,
    index: usize,
    buffers: Vec<Vec<Vec3>>,
    sink: Box<dyn TrajectorySink + Send>,
    flushes: usize,
}

impl HistoryRecorder {
    /// A recorder that flushes to `sink` every `depth` samples.
    pub fn new(depth: usize, sink: Box<dyn TrajectorySink + Send>) -> Self {
        Self {
            depth,
            index: 0,
            buffers: Vec::new(),
            sink,
            flushes: 0,
        }
    }

    /// Samples recorded since the last flush.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Samples per flush.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of flushes so far.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Append the current position of every occupied slot, flushing if
    /// the buffers are full.
    ///
    /// A body that first appears mid-buffer has fewer samples than the
    /// others in that flush.
    pub fn record(&mut self, bodies: &[Body]) -> Result<(), SimError> {
        if self.buffers.len() < bodies.len() {
            let depth = self.depth;
            self.buffers
                .resize_with(bodies.len(), || Vec::with_capacity(depth));
        }
        for (buffer, body) in self.buffers.iter_mut().zip(bodies) {
            buffer.push(body.position);
        }
        self.index += 1;
        if self.index >= self.depth {
            self.flush(bodies)?;
        }
        Ok(())
    }

    /// Write out any unflushed samples.
    pub fn finish(&mut self, bodies: &[Body]) -> Result<(), SimError> {
        if self.index > 0 {
            self.flush(bodies)?;
        }
        Ok(())
    }

    fn flush(&mut self, bodies: &[Body]) -> Result<(), SimError> {
        debug!("flushing {} history samples for {} bodies", self.index, bodies.len());
        for (buffer, body) in self.buffers.iter_mut().zip(bodies) {
            self.sink.write_samples(&body.name, buffer)?;
            buffer.clear();
        }
        self.sink.finish()?;
        self.index = 0;
        self.flushes += 1;
        Ok(())
    }
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder")
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("bodies", &self.buffers.len())
            .field("flushes", &self.flushes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_test_utils::{asteroid, planet, MemorySink};

    fn bodies() -> Vec<Body> {
        vec![
            planet("EARTH", Vec3::new(1.0, 2.0, 3.0), 1.0),
            asteroid("ROCK", Vec3::new(-1.0, 0.5, 0.0), 1.0),
        ]
    }

    #[test]
    fn flush_happens_exactly_at_depth() {
        let sink = MemorySink::new();
        let mut rec = HistoryRecorder::new(3, Box::new(sink.clone()));
        let b = bodies();

        rec.record(&b).unwrap();
        rec.record(&b).unwrap();
        assert_eq!(rec.index(), 2);
        assert_eq!(sink.flushes(), 0);

        rec.record(&b).unwrap();
        assert_eq!(rec.index(), 0);
        assert_eq!(sink.flushes(), 1);
        assert_eq!(sink.samples("EARTH").len(), 3);
        assert_eq!(sink.samples("ROCK")[0], Vec3::new(-1.0, 0.5, 0.0));
    }

    #[test]
    fn finish_flushes_only_pending_samples() {
        let sink = MemorySink::new();
        let mut rec = HistoryRecorder::new(2, Box::new(sink.clone()));
        let b = bodies();
        rec.record(&b).unwrap();
        rec.record(&b).unwrap();
        rec.finish(&b).unwrap();
        assert_eq!(sink.flushes(), 1);

        rec.record(&b).unwrap();
        rec.finish(&b).unwrap();
        assert_eq!(sink.flushes(), 2);
        assert_eq!(rec.flush_count(), 2);
        assert_eq!(sink.samples("EARTH").len(), 3);
    }

    #[test]
    fn late_bodies_get_their_own_buffers() {
        let sink = MemorySink::new();
        let mut rec = HistoryRecorder::new(10, Box::new(sink.clone()));
        let mut b = bodies();
        rec.record(&b).unwrap();
        b.push(asteroid("LATE", Vec3::splat(9.0), 1.0));
        rec.record(&b).unwrap();
        rec.finish(&b).unwrap();
        assert_eq!(sink.samples("EARTH").len(), 2);
        assert_eq!(sink.samples("LATE"), vec![Vec3::splat(9.0)]);
    }

    #[test]
    fn trajectory_file_truncates_then_appends() {
        let dir = std::env::temp_dir().join(format!("orbis-history-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.txt");
        std::fs::write(&path, "stale\n").unwrap();

        let mut file = TrajectoryFile::new(&path);
        file.write_samples("EARTH", &[Vec3::new(1.5, -2.0, 0.0)]).unwrap();
        file.finish().unwrap();
        file.write_samples("EARTH", &[Vec3::new(3.0, 0.0, 1.0)]).unwrap();
        file.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "EARTH_x=1.500000\nEARTH_y=-2.000000\nEARTH_z=0.000000\n\
             EARTH_x=3.000000\nEARTH_y=0.000000\nEARTH_z=1.000000\n"
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
